//! Binary tagged-length serialization for the CryptoNote wire dialect.
//!
//! Consensus objects, peer messages and persisted chain records all transit
//! one compact little-endian format: integers as canonical varints, strings
//! and byte arrays length-prefixed, fixed blobs raw, containers as a count
//! followed by elements. The format is deliberately non-self-describing; a
//! type's traversal ([`Seriable::seria`]) declares its fields in frozen order
//! and the same routine drives both the encode and decode backends.
//!
//! ```
//! use cn_seria::{from_bytes, to_bytes, DecodeLimits, Seria, Seriable, SeriaResult};
//! use cn_seria::seria_field;
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Probe {
//!     height: u64,
//!     tag: String,
//! }
//!
//! impl Seriable for Probe {
//!     fn seria<S: Seria>(&mut self, s: &mut S) -> SeriaResult<()> {
//!         s.begin_object()?;
//!         seria_field(s, "height", &mut self.height)?;
//!         seria_field(s, "tag", &mut self.tag)?;
//!         s.end_object()
//!     }
//! }
//!
//! let mut value = Probe { height: 300, tag: "abc".into() };
//! let bytes = to_bytes(&mut value).unwrap();
//! assert_eq!(bytes, [0xac, 0x02, 0x03, 0x61, 0x62, 0x63]);
//! let decoded: Probe = from_bytes(&bytes, &DecodeLimits::default()).unwrap();
//! assert_eq!(decoded, value);
//! ```
//!
//! Decoding never enforces exact consumption: trailing bytes belong to the
//! caller, which keeps concatenated record files parseable. Use
//! [`from_bytes_counted`] when the consumed length matters.

pub mod adapters;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod ser;
pub mod stream;
pub mod varint;

pub use adapters::{seria_fixed_vec, seria_map, seria_option, seria_vec};
pub use decoder::{BinaryDecoder, DecodeLimits};
pub use encoder::BinaryEncoder;
pub use error::{ErrorKind, SeriaError, SeriaResult};
pub use ser::{seria_field, Seria, Seriable, VarintValue};
pub use stream::{CappedStream, InputStream, OutputStream, SliceStream};
pub use varint::{read_varint, varint_len, write_varint, MAX_VARINT_LEN};

/// Encode `value` into a fresh buffer.
///
/// The traversal takes `&mut` in both directions; encoding only reads
/// through it.
pub fn to_bytes<T: Seriable>(value: &mut T) -> SeriaResult<Vec<u8>> {
    let mut buf = Vec::new();
    encode(&mut buf, value)?;
    Ok(buf)
}

/// Encode `value` into an existing sink.
pub fn encode<W, T>(sink: &mut W, value: &mut T) -> SeriaResult<()>
where
    W: OutputStream + ?Sized,
    T: Seriable,
{
    let mut encoder = BinaryEncoder::new(sink);
    value.seria(&mut encoder)
}

/// Populate `value` from a source, guarding every allocation with `limits`.
pub fn decode<R, T>(source: &mut R, value: &mut T, limits: &DecodeLimits) -> SeriaResult<()>
where
    R: InputStream + ?Sized,
    T: Seriable,
{
    let mut decoder = BinaryDecoder::new(source, *limits);
    value.seria(&mut decoder)
}

/// Decode a value from the front of `bytes`. Trailing bytes are permitted.
pub fn from_bytes<T>(bytes: &[u8], limits: &DecodeLimits) -> SeriaResult<T>
where
    T: Seriable + Default,
{
    Ok(from_bytes_counted(bytes, limits)?.0)
}

/// Decode a value from the front of `bytes`, returning it together with the
/// number of bytes consumed.
pub fn from_bytes_counted<T>(bytes: &[u8], limits: &DecodeLimits) -> SeriaResult<(T, usize)>
where
    T: Seriable + Default,
{
    let mut stream = SliceStream::new(bytes);
    let mut value = T::default();
    decode(&mut stream, &mut value, limits)?;
    Ok((value, stream.consumed()))
}
