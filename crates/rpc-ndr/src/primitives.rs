//! NDR primitive type implementations
//!
//! NDR primitive types and their encodings:
//!
//! | MIDL Type      | Rust Type | Size | Alignment |
//! |----------------|-----------|------|-----------|
//! | boolean        | bool      | 1    | 1         |
//! | byte/char      | u8        | 1    | 1         |
//! | small          | i8        | 1    | 1         |
//! | short          | i16       | 2    | 2         |
//! | enum           | u16       | 2    | 2         |
//! | long/int       | i32       | 4    | 4         |
//! | hyper          | i64       | 8    | 8         |
//! | unsigned short | u16       | 2    | 2         |
//! | unsigned long  | u32       | 4    | 4         |
//! | unsigned hyper | u64       | 8    | 8         |
//! | float          | f32       | 4    | 4         |
//! | double         | f64       | 8    | 8         |
//!
//! Floats are decoded by reinterpreting the raw bit pattern, never by numeric
//! conversion.

use bytes::Buf;

use crate::{NdrDecode, NdrError, NdrReader, Result, TypeDesc, Value};

/// Fixed-width NDR scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    U8,
    I8,
    U16,
    I16,
    /// 16-bit enumeration
    Enum,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
}

impl Primitive {
    /// Encoded size in octets
    pub const fn size(self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::Enum => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Required alignment, always equal to the size for NDR scalars
    pub const fn alignment(self) -> usize {
        self.size()
    }

    /// MIDL name of the type
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::U8 => "byte",
            Self::I8 => "small",
            Self::U16 => "unsigned short",
            Self::I16 => "short",
            Self::Enum => "enum",
            Self::U32 => "unsigned long",
            Self::I32 => "long",
            Self::F32 => "float",
            Self::U64 => "unsigned hyper",
            Self::I64 => "hyper",
            Self::F64 => "double",
        }
    }
}

impl<B: Buf> NdrReader<B> {
    /// Read one scalar into its dynamic value.
    pub fn read_primitive(&mut self, primitive: Primitive) -> Result<Value> {
        Ok(match primitive {
            Primitive::Bool => Value::Bool(self.read_bool()?),
            Primitive::U8 => Value::U8(self.read_u8()?),
            Primitive::I8 => Value::I8(self.read_i8()?),
            Primitive::U16 => Value::U16(self.read_u16()?),
            Primitive::I16 => Value::I16(self.read_i16()?),
            Primitive::Enum => Value::Enum(self.read_u16()?),
            Primitive::U32 => Value::U32(self.read_u32()?),
            Primitive::I32 => Value::I32(self.read_i32()?),
            Primitive::F32 => Value::F32(self.read_f32()?),
            Primitive::U64 => Value::U64(self.read_u64()?),
            Primitive::I64 => Value::I64(self.read_i64()?),
            Primitive::F64 => Value::F64(self.read_f64()?),
        })
    }
}

// Macro to implement NdrDecode for the Rust scalar matching each primitive
macro_rules! impl_ndr_primitive {
    ($ty:ty, $primitive:ident, $variant:ident) => {
        impl NdrDecode for $ty {
            fn ndr_type() -> Result<TypeDesc> {
                Ok(TypeDesc::Primitive(Primitive::$primitive))
            }

            fn from_ndr(value: Value) -> Result<Self> {
                match value.into_target() {
                    Some(Value::$variant(v)) => Ok(v),
                    Some(other) => Err(NdrError::type_mismatch(Primitive::$primitive.name(), &other)),
                    None => Err(NdrError::TypeMismatch {
                        expected: Primitive::$primitive.name(),
                        found: "null pointer",
                    }),
                }
            }
        }
    };
}

impl_ndr_primitive!(bool, Bool, Bool);
impl_ndr_primitive!(u8, U8, U8);
impl_ndr_primitive!(i8, I8, I8);
impl_ndr_primitive!(u16, U16, U16);
impl_ndr_primitive!(i16, I16, I16);
impl_ndr_primitive!(u32, U32, U32);
impl_ndr_primitive!(i32, I32, I32);
impl_ndr_primitive!(f32, F32, F32);
impl_ndr_primitive!(u64, U64, U64);
impl_ndr_primitive!(i64, I64, I64);
impl_ndr_primitive!(f64, F64, F64);
