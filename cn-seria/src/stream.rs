//! Byte stream abstractions consumed by the codec.
//!
//! The encoder writes through [`OutputStream`], the decoder reads through
//! [`InputStream`]. A stream is exclusively borrowed for the duration of one
//! traversal; the codec keeps no state of its own beyond it.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{SeriaError, SeriaResult};

/// Append-only byte sink.
pub trait OutputStream {
    /// Append raw bytes to the destination.
    fn write_bytes(&mut self, bytes: &[u8]) -> SeriaResult<()>;

    /// Number of bytes written so far.
    fn bytes_written(&self) -> usize;
}

/// Random-advance byte source.
pub trait InputStream {
    /// Read exactly `buf.len()` bytes into the provided slice.
    fn read_into(&mut self, buf: &mut [u8]) -> SeriaResult<()>;

    /// Bytes left in the source.
    fn remaining(&self) -> usize;

    #[inline]
    fn read_u8(&mut self) -> SeriaResult<u8> {
        let mut buf = [0u8; 1];
        self.read_into(&mut buf)?;
        Ok(buf[0])
    }
}

/// Input stream over a borrowed byte slice.
pub struct SliceStream<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> SliceStream<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes consumed since construction.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.offset
    }
}

impl InputStream for SliceStream<'_> {
    fn read_into(&mut self, buf: &mut [u8]) -> SeriaResult<()> {
        if self.remaining() < buf.len() {
            return Err(SeriaError::UnexpectedEnd {
                needed: buf.len(),
                remaining: self.remaining(),
            });
        }

        let end = self.offset + buf.len();
        buf.copy_from_slice(&self.buf[self.offset..end]);
        self.offset = end;
        Ok(())
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }
}

/// Bounded sink wrapper that fails with `OutOfSpace` once `capacity` bytes
/// have been written through it.
pub struct CappedStream<W> {
    inner: W,
    capacity: usize,
    written: usize,
}

impl<W: OutputStream> CappedStream<W> {
    #[inline]
    pub fn new(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            written: 0,
        }
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: OutputStream> OutputStream for CappedStream<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> SeriaResult<()> {
        let left = self.capacity - self.written;
        if bytes.len() > left {
            return Err(SeriaError::OutOfSpace {
                needed: bytes.len(),
                left,
            });
        }
        self.inner.write_bytes(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    #[inline]
    fn bytes_written(&self) -> usize {
        self.written
    }
}

impl OutputStream for Vec<u8> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> SeriaResult<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn bytes_written(&self) -> usize {
        self.len()
    }
}

impl OutputStream for BytesMut {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> SeriaResult<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn bytes_written(&self) -> usize {
        self.len()
    }
}

impl InputStream for Bytes {
    fn read_into(&mut self, buf: &mut [u8]) -> SeriaResult<()> {
        if Buf::remaining(self) < buf.len() {
            return Err(SeriaError::UnexpectedEnd {
                needed: buf.len(),
                remaining: Buf::remaining(self),
            });
        }
        self.copy_to_slice(buf);
        Ok(())
    }

    #[inline]
    fn remaining(&self) -> usize {
        Buf::remaining(self)
    }
}
