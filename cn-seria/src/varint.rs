//! Canonical variable-length integer encoding.
//!
//! An unsigned integer is written as little-endian groups of 7 payload bits,
//! the high bit of every byte except the last set as a continuation marker.
//! The encoding is minimal: a decoder rejects any representation that spends
//! more bytes than necessary, so every value has exactly one wire form.

use crate::error::{SeriaError, SeriaResult};
use crate::stream::{InputStream, OutputStream};

/// Longest canonical encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7f;

/// Number of bytes the canonical encoding of `value` occupies.
#[inline]
pub fn varint_len(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        (64 - value.leading_zeros() as usize).div_ceil(7)
    }
}

/// Write the canonical encoding of `value`.
pub fn write_varint<W: OutputStream + ?Sized>(stream: &mut W, mut value: u64) -> SeriaResult<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut len = 0;
    loop {
        let group = (value as u8) & PAYLOAD_MASK;
        value >>= 7;
        if value == 0 {
            buf[len] = group;
            len += 1;
            break;
        }
        buf[len] = group | CONTINUATION;
        len += 1;
    }
    stream.write_bytes(&buf[..len])
}

/// Read a canonically-encoded value of at most 64 bits.
///
/// Rejects encodings longer than [`MAX_VARINT_LEN`] bytes, encodings whose
/// value overflows 64 bits, and non-minimal encodings (a final byte that
/// contributes no payload bits).
pub fn read_varint<R: InputStream + ?Sized>(stream: &mut R) -> SeriaResult<u64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = stream.read_u8()?;
        let payload = byte & PAYLOAD_MASK;
        if shift == 63 && payload > 1 {
            return Err(SeriaError::VarintOverflow { width: 64 });
        }
        result |= u64::from(payload) << shift;
        if byte & CONTINUATION == 0 {
            if shift > 0 && payload == 0 {
                return Err(SeriaError::NonMinimalVarint);
            }
            return Ok(result);
        }
        shift += 7;
        if shift as usize >= MAX_VARINT_LEN * 7 {
            return Err(SeriaError::VarintTooLong);
        }
    }
}

/// Read a canonical varint and require it to fit into `width` bits.
pub fn read_varint_width<R: InputStream + ?Sized>(stream: &mut R, width: u32) -> SeriaResult<u64> {
    let value = read_varint(stream)?;
    if width < 64 && value >> width != 0 {
        return Err(SeriaError::VarintOverflow { width });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SliceStream;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint(&mut buf, value).unwrap();
        buf
    }

    fn decode(bytes: &[u8]) -> SeriaResult<u64> {
        read_varint(&mut SliceStream::new(bytes))
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(1), [0x01]);
        assert_eq!(encode(127), [0x7f]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(16383), [0xff, 0x7f]);
        assert_eq!(encode(16384), [0x80, 0x80, 0x01]);
        assert_eq!(
            encode(u64::MAX),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn boundary_roundtrip() {
        let mut values = vec![0u64, 1, u64::MAX];
        for bits in [7u32, 14, 21, 28, 35, 42, 49, 56, 63] {
            values.push((1 << bits) - 1);
            values.push(1 << bits);
        }
        for value in values {
            let bytes = encode(value);
            assert_eq!(bytes.len(), varint_len(value));
            let mut stream = SliceStream::new(&bytes);
            assert_eq!(read_varint(&mut stream).unwrap(), value);
            assert_eq!(stream.consumed(), bytes.len());
        }
    }

    #[test]
    fn rejects_non_minimal() {
        // 0 encoded with a spurious continuation group.
        assert_eq!(decode(&[0x80, 0x00]), Err(SeriaError::NonMinimalVarint));
        // 1 widened to two bytes.
        assert_eq!(decode(&[0x81, 0x00]), Err(SeriaError::NonMinimalVarint));
        // 127 widened to two bytes.
        assert_eq!(decode(&[0xff, 0x00]), Err(SeriaError::NonMinimalVarint));
    }

    #[test]
    fn rejects_too_long() {
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert_eq!(decode(&bytes), Err(SeriaError::VarintTooLong));
    }

    #[test]
    fn rejects_64_bit_overflow() {
        // Tenth byte may only carry the single top bit of a u64.
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert_eq!(decode(&bytes), Err(SeriaError::VarintOverflow { width: 64 }));
    }

    #[test]
    fn rejects_truncation() {
        assert_eq!(
            decode(&[0x80]),
            Err(SeriaError::UnexpectedEnd {
                needed: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn width_narrowing() {
        let bytes = encode(0x1_0000);
        assert_eq!(
            read_varint_width(&mut SliceStream::new(&bytes), 16),
            Err(SeriaError::VarintOverflow { width: 16 })
        );
        let bytes = encode(0xffff);
        assert_eq!(
            read_varint_width(&mut SliceStream::new(&bytes), 16).unwrap(),
            0xffff
        );
    }
}
