//! NDR array decoding
//!
//! NDR supports four array header shapes:
//!
//! - Fixed: size known from the type, no header
//! - Conformant: one `max_count` (u32) per dimension, hoisted to the start
//!   of the enclosing decode unit
//! - Varying: one `offset` + `actual_count` pair per dimension, inline
//! - Conformant Varying: both, conformance hoisted and variance inline
//!
//! Headers of every dimension are read and validated before the first
//! element. Elements follow in row-major order.

use std::collections::VecDeque;

use bytes::Buf;
use tracing::trace;

use crate::decode::Walker;
use crate::pointers::Segment;
use crate::{
    ArrayKind, ArrayLayout, Dimension, Layout, NdrDecode, NdrError, NdrReader, Result, TypeDesc,
    Value,
};

/// Transmitted window of a varying array dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaryingRecord {
    pub offset: u32,
    pub actual_count: u32,
}

impl VaryingRecord {
    pub fn decode<B: Buf>(reader: &mut NdrReader<B>) -> Result<Self> {
        let offset = reader.read_u32()?;
        let actual_count = reader.read_u32()?;
        Ok(Self {
            offset,
            actual_count,
        })
    }

    /// One past the last transmitted index, `None` on overflow
    pub fn end(&self) -> Option<u32> {
        self.offset.checked_add(self.actual_count)
    }
}

impl<'r, 's, B: Buf> Walker<'r, 's, B> {
    pub(crate) fn decode_array(
        &mut self,
        array: &'s ArrayLayout,
        conformance: &mut VecDeque<u32>,
    ) -> Result<Value> {
        let counts = self.array_counts(array, conformance)?;

        let total = counts
            .iter()
            .try_fold(1usize, |acc, &count| acc.checked_mul(count))
            .ok_or(NdrError::IntegerOverflow)?;
        // fixed sizes come from the schema, only wire counts are capped
        if array.kind != ArrayKind::Fixed && total > self.options.max_array_elements {
            return Err(NdrError::AllocationLimitExceeded {
                requested: total,
                limit: self.options.max_array_elements,
            });
        }

        self.decode_dimension(&counts, array.element.as_ref(), conformance)
    }

    /// Element count of every dimension, outer-to-inner.
    fn array_counts(
        &mut self,
        array: &ArrayLayout,
        conformance: &mut VecDeque<u32>,
    ) -> Result<Vec<usize>> {
        let dimensions = array.dims.len();

        let mut max_counts = Vec::new();
        if array.kind.is_conformant() {
            for _ in 0..dimensions {
                let max_count = conformance
                    .pop_front()
                    .ok_or_else(|| NdrError::unsupported("conformant array has no max_count"))?;
                max_counts.push(max_count);
            }
        }

        let mut windows = Vec::new();
        if array.kind.is_varying() {
            for _ in 0..dimensions {
                windows.push(VaryingRecord::decode(self.reader)?);
            }
        }

        let mut counts = Vec::with_capacity(dimensions);
        for (i, dimension) in array.dims.iter().enumerate() {
            let count = match array.kind {
                ArrayKind::Fixed => dimension.length(),
                ArrayKind::Conformant => max_counts[i] as usize,
                ArrayKind::Varying => {
                    let window = windows[i];
                    if let Dimension::Fixed(len) = *dimension {
                        let within = window.end().is_some_and(|end| end as usize <= len);
                        if !within {
                            return Err(NdrError::ArraySizeMismatch {
                                expected: len,
                                got: (window.offset as usize).saturating_add(window.actual_count as usize),
                            });
                        }
                    }
                    window.actual_count as usize
                }
                ArrayKind::ConformantVarying => {
                    let (max_count, window) = (max_counts[i], windows[i]);
                    let within = window.end().is_some_and(|end| end <= max_count);
                    if !within {
                        return Err(NdrError::ConformanceMismatch {
                            max_count,
                            actual_count: window.actual_count,
                        });
                    }
                    window.actual_count as usize
                }
            };
            if let Some(window) = windows.get(i).filter(|w| w.offset != 0) {
                trace!(
                    dimension = i,
                    offset = window.offset,
                    actual_count = window.actual_count,
                    "partial varying window"
                );
            }
            counts.push(count);
        }
        Ok(counts)
    }

    fn decode_dimension(
        &mut self,
        counts: &[usize],
        element: &'s Layout,
        conformance: &mut VecDeque<u32>,
    ) -> Result<Value> {
        let Some((&count, inner)) = counts.split_first() else {
            return self.decode_inline(element, conformance);
        };

        let mut items = Vec::with_capacity(count.min(self.reader.remaining()));
        for index in 0..count {
            self.path.push(Segment::Index(index));
            items.push(self.decode_dimension(inner, element, conformance)?);
            self.path.pop();
        }
        Ok(Value::Array(items))
    }
}

impl<T: NdrDecode> NdrDecode for Vec<T> {
    fn ndr_type() -> Result<TypeDesc> {
        Ok(TypeDesc::Slice(Box::new(T::ndr_type()?)))
    }

    fn from_ndr(value: Value) -> Result<Self> {
        value
            .into_array()?
            .into_iter()
            .enumerate()
            .map(|(i, item)| T::from_ndr(item).map_err(|e| e.at_index(i)))
            .collect()
    }
}

/// A fixed array converts only from a complete window. A `varying`
/// field that may transmit fewer than `N` elements should be a `Vec<T>`;
/// a short window fails with [`NdrError::ArraySizeMismatch`].
impl<T: NdrDecode, const N: usize> NdrDecode for [T; N] {
    fn ndr_type() -> Result<TypeDesc> {
        Ok(TypeDesc::Array {
            len: N,
            element: Box::new(T::ndr_type()?),
        })
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let items = Vec::<T>::from_ndr(value)?;
        let got = items.len();
        items
            .try_into()
            .map_err(|_| NdrError::ArraySizeMismatch { expected: N, got })
    }
}
