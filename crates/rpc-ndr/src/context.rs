//! NDR byte-order context
//!
//! The context records the integer representation selected by the common
//! header and provides the primitive getters used by [`NdrReader`](crate::NdrReader).
//! Callers must have checked `remaining()` before calling a getter.

use bytes::Buf;

// Multi-byte getter honouring the context's integer representation
macro_rules! ordered_get {
    ($name:ident, $ty:ty, $le:ident, $be:ident) => {
        #[inline]
        pub fn $name<B: Buf>(&self, buf: &mut B) -> $ty {
            if self.little_endian {
                buf.$le()
            } else {
                buf.$be()
            }
        }
    };
}

/// Integer representation of one NDR stream, fixed by its Common Header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdrContext {
    pub little_endian: bool,
}

impl NdrContext {
    /// Little endian, the representation Windows always emits
    pub fn new() -> Self {
        Self { little_endian: true }
    }

    pub fn big_endian() -> Self {
        Self { little_endian: false }
    }

    pub fn with_byte_order(little_endian: bool) -> Self {
        Self { little_endian }
    }

    /// Filler octets between `position` and the next multiple of
    /// `alignment`
    #[inline]
    pub fn align_padding(position: usize, alignment: usize) -> usize {
        if alignment <= 1 {
            return 0;
        }
        (alignment - position % alignment) % alignment
    }

    /// Read one octet; byte order does not apply.
    #[inline]
    pub fn get_u8<B: Buf>(&self, buf: &mut B) -> u8 {
        buf.get_u8()
    }

    #[inline]
    pub fn get_i8<B: Buf>(&self, buf: &mut B) -> i8 {
        buf.get_i8()
    }

    ordered_get!(get_u16, u16, get_u16_le, get_u16);
    ordered_get!(get_i16, i16, get_i16_le, get_i16);
    ordered_get!(get_u32, u32, get_u32_le, get_u32);
    ordered_get!(get_i32, i32, get_i32_le, get_i32);
    ordered_get!(get_u64, u64, get_u64_le, get_u64);
    ordered_get!(get_i64, i64, get_i64_le, get_i64);

    /// IEEE-754 single, taken bit for bit from the ordered u32
    #[inline]
    pub fn get_f32<B: Buf>(&self, buf: &mut B) -> f32 {
        f32::from_bits(self.get_u32(buf))
    }

    #[inline]
    pub fn get_f64<B: Buf>(&self, buf: &mut B) -> f64 {
        f64::from_bits(self.get_u64(buf))
    }
}

impl Default for NdrContext {
    fn default() -> Self {
        Self::new()
    }
}
