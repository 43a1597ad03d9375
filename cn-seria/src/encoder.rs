//! The binary encode backend.

use crate::error::{SeriaError, SeriaResult};
use crate::ser::{Seria, VarintValue};
use crate::stream::OutputStream;
use crate::varint::write_varint;

/// Visitor that streams a traversal into an [`OutputStream`].
///
/// Stateless apart from the borrowed sink and a frame-depth counter; the
/// only buffering is the single varint being formatted, so memory use is
/// O(1) on top of the sink.
pub struct BinaryEncoder<'a, W: OutputStream + ?Sized> {
    stream: &'a mut W,
    depth: usize,
}

impl<'a, W: OutputStream + ?Sized> BinaryEncoder<'a, W> {
    #[inline]
    pub fn new(stream: &'a mut W) -> Self {
        Self { stream, depth: 0 }
    }

    #[inline]
    fn close_frame(&mut self) -> SeriaResult<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or(SeriaError::InvalidUsage("close without matching begin"))?;
        Ok(())
    }
}

impl<W: OutputStream + ?Sized> Seria for BinaryEncoder<'_, W> {
    #[inline]
    fn is_input(&self) -> bool {
        false
    }

    fn begin_object(&mut self) -> SeriaResult<()> {
        self.depth += 1;
        Ok(())
    }

    fn end_object(&mut self) -> SeriaResult<()> {
        self.close_frame()
    }

    fn object_key(&mut self, _name: &'static str) -> SeriaResult<bool> {
        Ok(true)
    }

    fn begin_array(&mut self, size: &mut usize, fixed_size: bool) -> SeriaResult<()> {
        self.depth += 1;
        if !fixed_size {
            write_varint(self.stream, *size as u64)?;
        }
        Ok(())
    }

    fn end_array(&mut self) -> SeriaResult<()> {
        self.close_frame()
    }

    fn begin_map(&mut self, size: &mut usize) -> SeriaResult<()> {
        self.depth += 1;
        write_varint(self.stream, *size as u64)
    }

    fn next_map_key(&mut self, name: &mut String) -> SeriaResult<()> {
        self.seria_string(name)
    }

    fn end_map(&mut self) -> SeriaResult<()> {
        self.close_frame()
    }

    fn seria_varint<T: VarintValue>(&mut self, value: &mut T) -> SeriaResult<()> {
        write_varint(self.stream, value.into_wire())
    }

    fn seria_bool(&mut self, value: &mut bool) -> SeriaResult<()> {
        self.stream.write_bytes(&[u8::from(*value)])
    }

    fn seria_string(&mut self, value: &mut String) -> SeriaResult<()> {
        write_varint(self.stream, value.len() as u64)?;
        self.stream.write_bytes(value.as_bytes())
    }

    fn seria_bytes(&mut self, value: &mut Vec<u8>) -> SeriaResult<()> {
        write_varint(self.stream, value.len() as u64)?;
        self.stream.write_bytes(value)
    }

    fn seria_blob(&mut self, value: &mut [u8]) -> SeriaResult<()> {
        self.stream.write_bytes(value)
    }
}
