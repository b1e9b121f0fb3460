//! NDR decoding trait and structure walker

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Buf;
use tracing::{debug, trace};

use crate::pointers::{render, ReferentTable, Segment};
use crate::{
    DecodeOptions, FieldAttrs, Headers, Layout, NdrReader, Result, StructSchema, StructValue,
    TypeDesc, Value,
};

/// Trait for types that can be decoded from NDR format
///
/// A type describes its shape once through [`ndr_type`](Self::ndr_type) and
/// converts the dynamic value the walker produced in
/// [`from_ndr`](Self::from_ndr).
pub trait NdrDecode: Sized {
    /// Shape of the type, used to build layouts
    fn ndr_type() -> Result<TypeDesc>;

    /// Convert a decoded value into `Self`
    fn from_ndr(value: Value) -> Result<Self>;
}

/// Decoder for one top-level NDR buffer
///
/// The headers are parsed when the decoder is created. Each decode call then
/// reads one value from the current position.
#[derive(Debug)]
pub struct Decoder<B> {
    reader: NdrReader<B>,
    options: DecodeOptions,
    headers: Headers,
}

impl<B: Buf> Decoder<B> {
    pub fn new(buf: B) -> Result<Self> {
        Self::with_options(buf, DecodeOptions::default())
    }

    pub fn with_options(buf: B, options: DecodeOptions) -> Result<Self> {
        let mut reader = NdrReader::new(buf);
        let headers = Headers::decode(&mut reader)?;
        Ok(Self {
            reader,
            options,
            headers,
        })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Offset from the alignment origin
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Decode a `T` with no field annotations.
    pub fn decode<T: NdrDecode>(&mut self) -> Result<T> {
        self.decode_annotated("")
    }

    /// Decode a `T` as if it were a field carrying `annotation`, e.g. a
    /// top-level `Vec<u32>` with `"conformant"`.
    pub fn decode_annotated<T: NdrDecode>(&mut self, annotation: &str) -> Result<T> {
        let layout = Layout::of::<T>(annotation)?;
        T::from_ndr(self.decode_layout(&layout)?)
    }

    /// Decode an unannotated type description into a dynamic value.
    pub fn decode_type(&mut self, ty: &TypeDesc) -> Result<Value> {
        let layout = Layout::resolve(ty, &FieldAttrs::default())?;
        self.decode_layout(&layout)
    }

    /// Decode one value following `layout`, including every referent it
    /// schedules.
    pub fn decode_layout(&mut self, layout: &Layout) -> Result<Value> {
        let start = self.reader.consumed();
        if self.options.top_level_referent {
            let referent_id = self.reader.read_u32()?;
            trace!(referent_id, "skipped top-level referent");
        }

        let mut walker = Walker::new(&mut self.reader, self.options);
        let value = walker.run(layout)?;
        let referents = walker.table.len();

        debug!(
            bytes = self.reader.consumed() - start,
            referents,
            remaining = self.reader.remaining(),
            "decoded NDR value"
        );
        Ok(value)
    }
}

/// Walks a layout over the stream, one decode call at a time
pub(crate) struct Walker<'r, 's, B> {
    pub(crate) reader: &'r mut NdrReader<B>,
    pub(crate) options: DecodeOptions,
    pub(crate) table: ReferentTable<'s>,
    /// Field path of the value being decoded
    pub(crate) path: Vec<Segment<'s>>,
}

impl<'r, 's, B: Buf> Walker<'r, 's, B> {
    pub(crate) fn new(reader: &'r mut NdrReader<B>, options: DecodeOptions) -> Self {
        Self {
            reader,
            options,
            table: ReferentTable::new(options.aliasing),
            path: Vec::new(),
        }
    }

    /// Decode the value and all its referents, then link pointers to their
    /// payloads. Errors are attributed to the path being decoded when they
    /// occurred.
    pub(crate) fn run(&mut self, layout: &'s Layout) -> Result<Value> {
        if let Layout::Struct(schema) = layout {
            self.path.push(Segment::Field(schema.name.as_str()));
        }

        let mut root = match self.walk(layout) {
            Ok(root) => root,
            Err(e) => return Err(e.at_path(render(&self.path))),
        };
        self.table.link(&mut root)?;
        Ok(root)
    }

    fn walk(&mut self, layout: &'s Layout) -> Result<Value> {
        self.table.open_level();
        let root = self.decode_unit(layout)?;
        self.drain()?;
        self.table.close_level();
        Ok(root)
    }

    /// Decode one unit: the top-level value or a deferred referent. Hoisted
    /// conformance counts are read first, then the body is aligned.
    pub(crate) fn decode_unit(&mut self, layout: &'s Layout) -> Result<Value> {
        let hoisted = layout.hoisted_conformance();
        let mut conformance = VecDeque::with_capacity(hoisted);
        for _ in 0..hoisted {
            conformance.push_back(self.reader.read_u32()?);
        }
        self.reader.align(layout.alignment())?;
        self.decode_inline(layout, &mut conformance)
    }

    pub(crate) fn decode_inline(
        &mut self,
        layout: &'s Layout,
        conformance: &mut VecDeque<u32>,
    ) -> Result<Value> {
        match layout {
            Layout::Primitive(primitive) => self.reader.read_primitive(*primitive),
            Layout::Struct(schema) => self.decode_struct(schema, conformance),
            Layout::Array(array) => self.decode_array(array, conformance),
            Layout::Pointer(pointee) => self.decode_pointer(pointee.as_ref()),
        }
    }

    // Embedded structures share the enclosing unit's conformance counts and
    // referent queue.
    fn decode_struct(
        &mut self,
        schema: &'s Arc<StructSchema>,
        conformance: &mut VecDeque<u32>,
    ) -> Result<Value> {
        self.reader.align(schema.alignment)?;
        let mut fields = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            self.path.push(Segment::Field(field.name.as_str()));
            fields.push(self.decode_inline(&field.layout, conformance)?);
            self.path.pop();
        }
        Ok(Value::Struct(StructValue::new(Arc::clone(schema), fields)))
    }
}
