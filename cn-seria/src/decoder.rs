//! The binary decode backend.

use crate::error::{SeriaError, SeriaResult};
use crate::ser::{Seria, VarintValue};
use crate::stream::InputStream;
use crate::varint::{read_varint, read_varint_width};

/// Default ceiling for a single decoded allocation.
pub const DEFAULT_MAX_ALLOCATION: usize = 16 * 1024 * 1024;

/// Default ceiling for a single container's element count.
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 20;

/// Caller-supplied bounds applied before any decode-side allocation.
///
/// Adversarial inputs can claim lengths far beyond what the stream holds or
/// what the caller is prepared to materialise; these limits are checked
/// against every string, byte-array, array and map prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest single string or byte-array allocation, in bytes.
    pub max_allocation: usize,
    /// Largest array or map element count.
    pub max_elements: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_allocation: DEFAULT_MAX_ALLOCATION,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

impl DecodeLimits {
    /// Limits for fully-trusted input, e.g. re-reading files this process
    /// wrote itself.
    pub fn unbounded() -> Self {
        Self {
            max_allocation: usize::MAX,
            max_elements: usize::MAX,
        }
    }
}

/// Visitor that populates a traversal from an [`InputStream`].
pub struct BinaryDecoder<'a, R: InputStream + ?Sized> {
    stream: &'a mut R,
    limits: DecodeLimits,
    depth: usize,
}

impl<'a, R: InputStream + ?Sized> BinaryDecoder<'a, R> {
    #[inline]
    pub fn new(stream: &'a mut R, limits: DecodeLimits) -> Self {
        Self {
            stream,
            limits,
            depth: 0,
        }
    }

    #[inline]
    fn close_frame(&mut self) -> SeriaResult<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or(SeriaError::InvalidUsage("close without matching begin"))?;
        Ok(())
    }

    /// Validate a wire-declared element count before anything is allocated.
    /// Every element occupies at least one byte, so a count beyond the
    /// remaining stream length can never be satisfied.
    fn checked_count(&mut self) -> SeriaResult<usize> {
        let count = read_varint(self.stream)?;
        if count > self.limits.max_elements as u64 {
            return Err(SeriaError::CountOverLimit {
                count,
                max: self.limits.max_elements as u64,
            });
        }
        if count > self.stream.remaining() as u64 {
            return Err(SeriaError::LengthOverInput {
                len: count,
                remaining: self.stream.remaining(),
            });
        }
        Ok(count as usize)
    }

    /// Validate a wire-declared byte length and read that many bytes.
    fn read_length_prefixed(&mut self) -> SeriaResult<Vec<u8>> {
        let len = read_varint(self.stream)?;
        if len > self.limits.max_allocation as u64 {
            return Err(SeriaError::LengthOverLimit {
                len,
                max: self.limits.max_allocation as u64,
            });
        }
        if len > self.stream.remaining() as u64 {
            return Err(SeriaError::LengthOverInput {
                len,
                remaining: self.stream.remaining(),
            });
        }
        let mut buf = vec![0u8; len as usize];
        self.stream.read_into(&mut buf)?;
        Ok(buf)
    }
}

impl<R: InputStream + ?Sized> Seria for BinaryDecoder<'_, R> {
    #[inline]
    fn is_input(&self) -> bool {
        true
    }

    fn begin_object(&mut self) -> SeriaResult<()> {
        self.depth += 1;
        Ok(())
    }

    fn end_object(&mut self) -> SeriaResult<()> {
        self.close_frame()
    }

    fn object_key(&mut self, _name: &'static str) -> SeriaResult<bool> {
        // Every declared key is required in the binary dialect.
        Ok(true)
    }

    fn begin_array(&mut self, size: &mut usize, fixed_size: bool) -> SeriaResult<()> {
        self.depth += 1;
        if !fixed_size {
            *size = self.checked_count()?;
        }
        Ok(())
    }

    fn end_array(&mut self) -> SeriaResult<()> {
        self.close_frame()
    }

    fn begin_map(&mut self, size: &mut usize) -> SeriaResult<()> {
        self.depth += 1;
        *size = self.checked_count()?;
        Ok(())
    }

    fn next_map_key(&mut self, name: &mut String) -> SeriaResult<()> {
        self.seria_string(name)
    }

    fn end_map(&mut self) -> SeriaResult<()> {
        self.close_frame()
    }

    fn seria_varint<T: VarintValue>(&mut self, value: &mut T) -> SeriaResult<()> {
        let raw = read_varint_width(self.stream, T::WIDTH)?;
        *value = T::from_wire(raw);
        Ok(())
    }

    fn seria_bool(&mut self, value: &mut bool) -> SeriaResult<()> {
        match self.stream.read_u8()? {
            0 => *value = false,
            1 => *value = true,
            byte => return Err(SeriaError::InvalidBool(byte)),
        }
        Ok(())
    }

    fn seria_string(&mut self, value: &mut String) -> SeriaResult<()> {
        let buf = self.read_length_prefixed()?;
        *value = String::from_utf8(buf).map_err(|_| SeriaError::InvalidUtf8)?;
        Ok(())
    }

    fn seria_bytes(&mut self, value: &mut Vec<u8>) -> SeriaResult<()> {
        *value = self.read_length_prefixed()?;
        Ok(())
    }

    fn seria_blob(&mut self, value: &mut [u8]) -> SeriaResult<()> {
        self.stream.read_into(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SliceStream;

    #[test]
    fn bool_strictness() {
        for byte in 0u8..=255 {
            let data = [byte];
            let mut stream = SliceStream::new(&data);
            let mut dec = BinaryDecoder::new(&mut stream, DecodeLimits::default());
            let mut value = false;
            let result = dec.seria_bool(&mut value);
            match byte {
                0 => assert_eq!((result, value), (Ok(()), false)),
                1 => assert_eq!((result, value), (Ok(()), true)),
                _ => assert_eq!(result, Err(SeriaError::InvalidBool(byte))),
            }
        }
    }

    #[test]
    fn adversarial_length_rejected_before_allocation() {
        // Claims 2^32 bytes with only two in the stream.
        let data = [0x80, 0x80, 0x80, 0x80, 0x10, 0xaa, 0xbb];
        let mut stream = SliceStream::new(&data);
        let mut dec = BinaryDecoder::new(&mut stream, DecodeLimits::unbounded());
        let mut value = Vec::new();
        assert_eq!(
            dec.seria_bytes(&mut value),
            Err(SeriaError::LengthOverInput {
                len: 1 << 32,
                remaining: 2
            })
        );
    }

    #[test]
    fn allocation_limit_applies_before_stream_length() {
        let mut data = vec![0x08];
        data.extend_from_slice(&[0u8; 8]);
        let mut stream = SliceStream::new(&data);
        let limits = DecodeLimits {
            max_allocation: 4,
            ..DecodeLimits::default()
        };
        let mut dec = BinaryDecoder::new(&mut stream, limits);
        let mut value = Vec::new();
        assert_eq!(
            dec.seria_bytes(&mut value),
            Err(SeriaError::LengthOverLimit { len: 8, max: 4 })
        );
    }

    #[test]
    fn element_count_guard() {
        let data = [0x05, 0x01, 0x02];
        let mut stream = SliceStream::new(&data);
        let limits = DecodeLimits {
            max_elements: 4,
            ..DecodeLimits::default()
        };
        let mut dec = BinaryDecoder::new(&mut stream, limits);
        let mut size = 0usize;
        assert_eq!(
            dec.begin_array(&mut size, false),
            Err(SeriaError::CountOverLimit { count: 5, max: 4 })
        );
    }

    #[test]
    fn fixed_size_array_reads_no_count() {
        let data = [0xaa];
        let mut stream = SliceStream::new(&data);
        let mut dec = BinaryDecoder::new(&mut stream, DecodeLimits::default());
        let mut size = 3usize;
        dec.begin_array(&mut size, true).unwrap();
        assert_eq!(size, 3);
        assert_eq!(stream.consumed(), 0);
    }
}
