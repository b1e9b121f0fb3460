//! Static schema descriptors
//!
//! A [`TypeDesc`] describes the Rust-side shape of a value. Field annotations
//! (`pointer`, `conformant`, `varying`, `dimensions:N`) are parsed once, when
//! a [`StructSchema`] is built, and combined with the type into a [`Layout`]
//! that the walker follows without further interpretation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{NdrDecode, NdrError, Primitive, Result};

/// Shape of a Rust type as seen by the decoder
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    Primitive(Primitive),
    /// Fixed-length array
    Array { len: usize, element: Box<TypeDesc> },
    /// Dynamically sized array, length taken from the wire
    Slice(Box<TypeDesc>),
    Struct(Arc<StructSchema>),
}

impl TypeDesc {
    /// Lengths of every nested array level, outermost first, with 0 for
    /// dynamic levels, plus the innermost element type.
    ///
    /// `[[[Vec<T>; 2]; 2]; 2]` reports `[2, 2, 2, 0]`.
    pub fn dimension_lengths(&self) -> (Vec<usize>, &TypeDesc) {
        let mut lengths = Vec::new();
        let mut current = self;
        while let Some((dimension, element)) = current.array_level() {
            lengths.push(dimension.length());
            current = element;
        }
        (lengths, current)
    }

    fn array_level(&self) -> Option<(Dimension, &TypeDesc)> {
        match self {
            Self::Array { len, element } => Some((Dimension::Fixed(*len), element)),
            Self::Slice(element) => Some((Dimension::Dynamic, element)),
            _ => None,
        }
    }
}

/// Parsed field annotations
///
/// Written as a comma separated list, e.g. `"pointer,conformant,varying"`.
/// Names may appear in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldAttrs {
    pub pointer: bool,
    pub conformant: bool,
    pub varying: bool,
    pub dimensions: Option<usize>,
}

impl FieldAttrs {
    pub fn parse(annotation: &str) -> Result<Self> {
        annotation.parse()
    }

    fn is_plain(&self) -> bool {
        !self.conformant && !self.varying && self.dimensions.is_none()
    }
}

impl FromStr for FieldAttrs {
    type Err = NdrError;

    fn from_str(s: &str) -> Result<Self> {
        let mut attrs = Self::default();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.split_once(':') {
                Some(("dimensions", count)) => {
                    let count = count.trim().parse::<usize>().map_err(|_| {
                        NdrError::unsupported(format!("invalid dimension count {count:?}"))
                    })?;
                    if count == 0 {
                        return Err(NdrError::unsupported("dimension count must be at least 1"));
                    }
                    attrs.dimensions = Some(count);
                }
                Some((key, _)) => {
                    return Err(NdrError::unsupported(format!("unknown annotation {key:?}")));
                }
                None => match token {
                    "pointer" => attrs.pointer = true,
                    "conformant" => attrs.conformant = true,
                    "varying" => attrs.varying = true,
                    other => {
                        return Err(NdrError::unsupported(format!("unknown annotation {other:?}")));
                    }
                },
            }
        }
        Ok(attrs)
    }
}

/// Header shape of an array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    Fixed,
    Conformant,
    Varying,
    ConformantVarying,
}

impl ArrayKind {
    fn from_attrs(attrs: &FieldAttrs) -> Self {
        match (attrs.conformant, attrs.varying) {
            (false, false) => Self::Fixed,
            (true, false) => Self::Conformant,
            (false, true) => Self::Varying,
            (true, true) => Self::ConformantVarying,
        }
    }

    pub fn is_conformant(self) -> bool {
        matches!(self, Self::Conformant | Self::ConformantVarying)
    }

    pub fn is_varying(self) -> bool {
        matches!(self, Self::Varying | Self::ConformantVarying)
    }
}

/// One array dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Fixed(usize),
    /// Length resolved from the wire
    Dynamic,
}

impl Dimension {
    /// Static length, 0 until resolved from data
    pub fn length(self) -> usize {
        match self {
            Self::Fixed(len) => len,
            Self::Dynamic => 0,
        }
    }
}

/// Array descriptor: header kind, dimensions outer-to-inner, element layout
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLayout {
    pub kind: ArrayKind,
    pub dims: Vec<Dimension>,
    pub element: Box<Layout>,
}

impl ArrayLayout {
    /// Split an array type into the dimensions covered by `attrs` and the
    /// element layout below them.
    ///
    /// Without `dimensions:N`, a fixed array covers every nested fixed level
    /// and a conformant or varying array covers one level. A dynamic level
    /// directly below a dynamic array is ambiguous and must be declared.
    pub fn analyze(ty: &TypeDesc, attrs: &FieldAttrs) -> Result<Self> {
        let kind = ArrayKind::from_attrs(attrs);
        let mut dims = Vec::new();
        let mut element = ty;

        while let Some((dimension, inner)) = element.array_level() {
            let take = match attrs.dimensions {
                Some(count) => dims.len() < count,
                None if kind == ArrayKind::Fixed => true,
                None => dims.is_empty(),
            };
            if !take {
                break;
            }
            dims.push(dimension);
            element = inner;
        }

        if let Some(count) = attrs.dimensions {
            if dims.len() < count {
                return Err(NdrError::unsupported(format!(
                    "{count} dimensions declared but the type nests {}",
                    dims.len()
                )));
            }
        }
        if dims.is_empty() {
            return Err(NdrError::unsupported("array annotation on a non-array type"));
        }

        match kind {
            ArrayKind::Fixed if dims.contains(&Dimension::Dynamic) => {
                return Err(NdrError::unsupported(
                    "dynamic dimension requires a conformant or varying annotation",
                ));
            }
            ArrayKind::Conformant | ArrayKind::ConformantVarying
                if dims.iter().any(|d| matches!(d, Dimension::Fixed(_))) =>
            {
                return Err(NdrError::unsupported("fixed-length dimension cannot be conformant"));
            }
            _ => {}
        }

        if attrs.dimensions.is_none() && kind != ArrayKind::Fixed {
            if let Some((Dimension::Dynamic, _)) = element.array_level() {
                return Err(NdrError::unsupported(
                    "nested dynamic arrays need an explicit dimensions:N annotation",
                ));
            }
        }

        let element = Layout::resolve(element, &FieldAttrs::default())?;
        if element.hoisted_conformance() > 0 {
            return Err(NdrError::unsupported(
                "array elements cannot contain conformant arrays",
            ));
        }

        Ok(Self {
            kind,
            dims,
            element: Box::new(element),
        })
    }

    /// Dimension lengths outer-to-inner, 0 for dynamic dimensions
    pub fn dimension_lengths(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.length()).collect()
    }

    /// Element alignment, raised to 4 when a conformance or variance
    /// header belongs to the array
    pub fn alignment(&self) -> usize {
        let element = self.element.alignment();
        if self.kind == ArrayKind::Fixed {
            element
        } else {
            element.max(4)
        }
    }

    /// Lengths of a fully fixed array
    pub fn static_lengths(&self) -> Option<Vec<usize>> {
        self.dims
            .iter()
            .map(|d| match d {
                Dimension::Fixed(len) => Some(*len),
                Dimension::Dynamic => None,
            })
            .collect()
    }
}

/// Resolved decoding plan for one field or top-level value
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Primitive(Primitive),
    Struct(Arc<StructSchema>),
    Array(ArrayLayout),
    /// Referent ID inline, pointee decoded deferred
    Pointer(Box<Layout>),
}

impl Layout {
    /// Combine a type with its annotations.
    pub fn resolve(ty: &TypeDesc, attrs: &FieldAttrs) -> Result<Self> {
        if attrs.pointer {
            let pointee = FieldAttrs {
                pointer: false,
                ..*attrs
            };
            return Ok(Self::Pointer(Box::new(Self::resolve(ty, &pointee)?)));
        }

        match ty {
            TypeDesc::Primitive(primitive) => {
                ensure_plain(attrs, primitive.name())?;
                Ok(Self::Primitive(*primitive))
            }
            TypeDesc::Struct(schema) => {
                ensure_plain(attrs, &schema.name)?;
                Ok(Self::Struct(Arc::clone(schema)))
            }
            TypeDesc::Array { .. } | TypeDesc::Slice(_) => {
                Ok(Self::Array(ArrayLayout::analyze(ty, attrs)?))
            }
        }
    }

    /// Layout of `T` with the given annotation string
    pub fn of<T: NdrDecode>(annotation: &str) -> Result<Self> {
        Self::resolve(&T::ndr_type()?, &annotation.parse()?)
    }

    /// Boundary the value starts on. Structures align to their widest
    /// member; pointers to their 4-byte referent ID.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Primitive(primitive) => primitive.alignment(),
            Self::Struct(schema) => schema.alignment,
            Self::Array(array) => array.alignment(),
            Self::Pointer(_) => 4,
        }
    }

    /// Number of conformance counts this layout contributes to the start of
    /// its enclosing decode unit
    pub fn hoisted_conformance(&self) -> usize {
        match self {
            Self::Primitive(_) | Self::Pointer(_) => 0,
            Self::Struct(schema) => schema.hoisted,
            Self::Array(array) if array.kind.is_conformant() => array.dims.len(),
            Self::Array(_) => 0,
        }
    }
}

fn ensure_plain(attrs: &FieldAttrs, what: &str) -> Result<()> {
    if attrs.is_plain() {
        Ok(())
    } else {
        Err(NdrError::unsupported(format!(
            "array annotations are not valid on {what}"
        )))
    }
}

/// One field of a structure
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub attrs: FieldAttrs,
    pub layout: Layout,
}

/// Ordered field descriptors of a structure
#[derive(Debug, Clone, PartialEq)]
pub struct StructSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
    /// Conformance counts read at the start of the structure
    pub hoisted: usize,
    pub alignment: usize,
}

impl StructSchema {
    pub fn builder(name: impl Into<String>) -> StructSchemaBuilder {
        StructSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            error: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl fmt::Display for StructSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {} (", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field.name)?;
        }
        write!(f, ")")
    }
}

/// Registers fields in declaration order. The first invalid field is
/// reported by [`build`](Self::build).
#[derive(Debug)]
pub struct StructSchemaBuilder {
    name: String,
    fields: Vec<FieldSchema>,
    error: Option<NdrError>,
}

impl StructSchemaBuilder {
    /// Add an unannotated field.
    pub fn field<T: NdrDecode>(self, name: &str) -> Self {
        self.annotated::<T>(name, "")
    }

    /// Add a field with an annotation string.
    pub fn annotated<T: NdrDecode>(self, name: &str, annotation: &str) -> Self {
        match T::ndr_type() {
            Ok(ty) => self.field_desc(name, ty, annotation),
            Err(e) => self.fail(e.at_field(name)),
        }
    }

    /// Add a field from an explicit type description.
    pub fn field_desc(mut self, name: &str, ty: TypeDesc, annotation: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.fields.iter().any(|f| f.name == name) {
            return self.fail(NdrError::unsupported(format!("duplicate field {name:?}")));
        }

        let resolved = FieldAttrs::parse(annotation)
            .and_then(|attrs| Ok((attrs, Layout::resolve(&ty, &attrs)?)));
        match resolved {
            Ok((attrs, layout)) => {
                self.fields.push(FieldSchema {
                    name: name.to_string(),
                    attrs,
                    layout,
                });
                self
            }
            Err(e) => self.fail(e.at_field(name)),
        }
    }

    fn fail(mut self, error: NdrError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    pub fn build(self) -> Result<Arc<StructSchema>> {
        if let Some(error) = self.error {
            return Err(error.at_field(&self.name));
        }
        let hoisted = self.fields.iter().map(|f| f.layout.hoisted_conformance()).sum();
        let alignment = self
            .fields
            .iter()
            .map(|f| f.layout.alignment())
            .max()
            .unwrap_or(1);
        Ok(Arc::new(StructSchema {
            name: self.name,
            fields: self.fields,
            hoisted,
            alignment,
        }))
    }
}
