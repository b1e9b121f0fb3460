//! Dynamic decoded values
//!
//! The walker produces a [`Value`] tree shaped by the layout it was given.
//! Typed decoding converts that tree through [`NdrDecode::from_ndr`].

use std::fmt;
use std::sync::Arc;

use crate::pointers::SlotId;
use crate::{NdrDecode, NdrError, Result, StructSchema};

/// A decoded NDR value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    Enum(u16),
    U32(u32),
    I32(i32),
    F32(f32),
    U64(u64),
    I64(i64),
    F64(f64),
    /// One array dimension; nested dimensions are nested arrays, row-major
    Array(Vec<Value>),
    Struct(StructValue),
    Pointer(Pointer),
}

impl Value {
    /// Short description of the value's shape for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::U8(_) => "byte",
            Self::I8(_) => "small",
            Self::U16(_) => "unsigned short",
            Self::I16(_) => "short",
            Self::Enum(_) => "enum",
            Self::U32(_) => "unsigned long",
            Self::I32(_) => "long",
            Self::F32(_) => "float",
            Self::U64(_) => "unsigned hyper",
            Self::I64(_) => "hyper",
            Self::F64(_) => "double",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
            Self::Pointer(_) => "pointer",
        }
    }

    /// Follow pointers to the value they refer to. `None` for a null pointer.
    pub fn into_target(self) -> Option<Value> {
        match self {
            Self::Pointer(pointer) => match pointer.target {
                Target::Null => None,
                Target::Resolved(inner) => inner.into_target(),
                Target::Pending(_) => Some(Self::Pointer(pointer)),
            },
            other => Some(other),
        }
    }

    /// Unwrap a structure value, following pointers.
    pub fn into_struct(self, expected: &'static str) -> Result<StructValue> {
        match self.into_target() {
            Some(Self::Struct(value)) if value.name() == expected => Ok(value),
            Some(other) => Err(NdrError::TypeMismatch {
                expected,
                found: other.kind_name(),
            }),
            None => Err(NdrError::TypeMismatch {
                expected,
                found: "null pointer",
            }),
        }
    }

    /// Unwrap one array dimension, following pointers. A null pointer is an
    /// empty array.
    pub fn into_array(self) -> Result<Vec<Value>> {
        match self.into_target() {
            Some(Self::Array(items)) => Ok(items),
            Some(other) => Err(NdrError::type_mismatch("array", &other)),
            None => Ok(Vec::new()),
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&Pointer> {
        match self {
            Self::Pointer(pointer) => Some(pointer),
            _ => None,
        }
    }

    /// Numeric value of any unsigned or signed integer up to 32 bits
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::U8(v) => Some(v.into()),
            Self::U16(v) | Self::Enum(v) => Some(v.into()),
            Self::U32(v) => Some(v),
            _ => None,
        }
    }
}

/// Decoded structure: field values in declaration order
#[derive(Clone)]
pub struct StructValue {
    schema: Arc<StructSchema>,
    fields: Vec<Option<Value>>,
}

impl StructValue {
    pub(crate) fn new(schema: Arc<StructSchema>, fields: Vec<Value>) -> Self {
        Self {
            schema,
            fields: fields.into_iter().map(Some).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &Arc<StructSchema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.schema.field_index(name)?;
        self.fields.get(index)?.as_ref()
    }

    /// Move a field out and convert it. Conversion errors carry the field
    /// name in their path.
    pub fn take<T: NdrDecode>(&mut self, name: &str) -> Result<T> {
        let value = self
            .schema
            .field_index(name)
            .and_then(|index| self.fields.get_mut(index))
            .and_then(Option::take)
            .ok_or_else(|| NdrError::MissingField(format!("{}.{name}", self.schema.name)))?;
        T::from_ndr(value).map_err(|e| e.at_field(name))
    }

    /// Fields still present, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields
            .iter()
            .zip(&self.fields)
            .filter_map(|(field, value)| Some((field.name.as_str(), value.as_ref()?)))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.fields.iter_mut().flatten()
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.fields == other.fields
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(&self.schema.name);
        for (name, value) in self.iter() {
            out.field(name, value);
        }
        out.finish()
    }
}

/// Decoded pointer: the referent ID from the wire and the value it refers to
#[derive(Debug, Clone, PartialEq)]
pub struct Pointer {
    referent_id: u32,
    pub(crate) target: Target,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Target {
    Null,
    /// Scheduled for deferred decoding, replaced once linked
    Pending(SlotId),
    Resolved(Box<Value>),
}

impl Pointer {
    pub(crate) fn null() -> Self {
        Self {
            referent_id: 0,
            target: Target::Null,
        }
    }

    pub(crate) fn pending(referent_id: u32, slot: SlotId) -> Self {
        Self {
            referent_id,
            target: Target::Pending(slot),
        }
    }

    pub fn referent_id(&self) -> u32 {
        self.referent_id
    }

    pub fn is_null(&self) -> bool {
        matches!(self.target, Target::Null)
    }

    /// The referent, if the pointer is non-null
    pub fn get(&self) -> Option<&Value> {
        match &self.target {
            Target::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_inner(self) -> Option<Value> {
        match self.target {
            Target::Resolved(value) => Some(*value),
            _ => None,
        }
    }
}
