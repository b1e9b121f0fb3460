//! Byte stream with NDR alignment tracking
//!
//! Offsets are measured from the alignment origin, which the decoder moves to
//! the first byte after the headers. Every aligned read checks that padding
//! plus payload are available before consuming anything, so a failed read
//! leaves both the buffer and the offset untouched.

use bytes::{Buf, Bytes};

use crate::{NdrContext, NdrError, Result};

macro_rules! aligned_read {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $width:expr, $get:ident) => {
        $(#[$doc])*
        pub fn $name(&mut self) -> Result<$ty> {
            let padding = self.reserve($width, $width)?;
            self.check_aligned(self.position + padding, $width)?;
            self.skip(padding);
            let value = self.ctx.$get(&mut self.buf);
            self.advance_position($width);
            Ok(value)
        }
    };
}

/// Forward-only NDR byte stream
#[derive(Debug)]
pub struct NdrReader<B> {
    buf: B,
    ctx: NdrContext,
    /// Bytes consumed since the alignment origin
    position: usize,
    /// Bytes consumed since construction
    consumed: usize,
}

impl<B: Buf> NdrReader<B> {
    /// Wrap a buffer. Byte order defaults to little endian until a header
    /// selects otherwise.
    pub fn new(buf: B) -> Self {
        Self::with_context(buf, NdrContext::new())
    }

    pub fn with_context(buf: B, ctx: NdrContext) -> Self {
        Self {
            buf,
            ctx,
            position: 0,
            consumed: 0,
        }
    }

    pub fn context(&self) -> NdrContext {
        self.ctx
    }

    pub fn set_context(&mut self, ctx: NdrContext) {
        self.ctx = ctx;
    }

    /// Offset from the alignment origin
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total bytes consumed, headers included
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Place the alignment origin at the current read position.
    pub fn mark_origin(&mut self) {
        self.position = 0;
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Consume filler so the next read of `alignment` width starts aligned.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = self.reserve(alignment, 0)?;
        self.skip(padding);
        Ok(())
    }

    /// Read exactly `len` octets with no alignment.
    pub fn read_exact(&mut self, len: usize) -> Result<Bytes> {
        if self.buf.remaining() < len {
            return Err(NdrError::EndOfStream {
                needed: len,
                have: self.buf.remaining(),
            });
        }
        let bytes = self.buf.copy_to_bytes(len);
        self.advance_position(len);
        Ok(bytes)
    }

    /// NDR boolean: one octet, any non-zero value is true
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    aligned_read!(read_u8, u8, 1, get_u8);
    aligned_read!(read_i8, i8, 1, get_i8);
    aligned_read!(read_u16, u16, 2, get_u16);
    aligned_read!(read_i16, i16, 2, get_i16);
    aligned_read!(read_u32, u32, 4, get_u32);
    aligned_read!(read_i32, i32, 4, get_i32);
    aligned_read!(read_u64, u64, 8, get_u64);
    aligned_read!(read_i64, i64, 8, get_i64);
    aligned_read!(
        /// Single-precision float, reinterpreted from its bit pattern
        read_f32, f32, 4, get_f32
    );
    aligned_read!(
        /// Double-precision float, reinterpreted from its bit pattern
        read_f64, f64, 8, get_f64
    );

    /// Padding required before a read of `size` bytes aligned to
    /// `alignment`, failing if padding and payload are not both available.
    fn reserve(&self, alignment: usize, size: usize) -> Result<usize> {
        let padding = NdrContext::align_padding(self.position, alignment);
        let needed = padding + size;
        if self.buf.remaining() < needed {
            return Err(NdrError::EndOfStream {
                needed,
                have: self.buf.remaining(),
            });
        }
        Ok(padding)
    }

    fn check_aligned(&self, offset: usize, width: usize) -> Result<()> {
        if width > 1 && offset % width != 0 {
            return Err(NdrError::MisalignedRead { offset, width });
        }
        Ok(())
    }

    fn skip(&mut self, padding: usize) {
        self.buf.advance(padding);
        self.advance_position(padding);
    }

    fn advance_position(&mut self, len: usize) {
        self.position += len;
        self.consumed += len;
    }
}
