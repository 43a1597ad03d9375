//! Fixed-width binary primitives.
//!
//! Hashes, keys and signatures transit the wire as raw blobs with no length
//! prefix; their widths are consensus constants. The node treats them as
//! opaque: computing them is the currency layer's business.

use std::fmt;
use std::str::FromStr;

use cn_seria::{Seria, SeriaResult, Seriable};
use thiserror::Error;

/// Width of every hash-like primitive, in bytes.
pub const HASH_SIZE: usize = 32;

/// Width of a ring signature element, in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Error returned when parsing a fixed-width primitive from hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FromHexError {
    #[error("expected {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex digit")]
    InvalidDigit,
}

macro_rules! fixed_blob {
    ($(#[$doc:meta])* $name:ident, $size:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub [u8; $size]);

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self([0u8; $size])
            }
        }

        impl $name {
            #[inline]
            pub const fn new(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            #[inline]
            pub fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            #[inline]
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|byte| *byte == 0)
            }
        }

        impl Seriable for $name {
            #[inline]
            fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
                seria.seria_blob(&mut self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.len() != $size * 2 {
                    return Err(FromHexError::InvalidLength {
                        expected: $size * 2,
                        actual: s.len(),
                    });
                }
                let mut bytes = [0u8; $size];
                hex::decode_to_slice(s, &mut bytes).map_err(|_| FromHexError::InvalidDigit)?;
                Ok(Self(bytes))
            }
        }
    };
}

fixed_blob! {
    /// A 256-bit hash identifying a block or transaction.
    Hash, HASH_SIZE
}

fixed_blob! {
    /// A curve point naming the destination of an output.
    PublicKey, HASH_SIZE
}

fixed_blob! {
    /// The key image that marks an output as spent.
    KeyImage, HASH_SIZE
}

fixed_blob! {
    /// One ring signature element.
    Signature, SIGNATURE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_seria::{from_bytes_counted, to_bytes, DecodeLimits};
    use hex_literal::hex;

    #[test]
    fn blob_has_no_length_prefix() {
        let mut hash = Hash::new([0x5a; 32]);
        let bytes = to_bytes(&mut hash).unwrap();
        assert_eq!(bytes, [0x5a; 32]);

        let (decoded, consumed) =
            from_bytes_counted::<Hash>(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, hash);
        assert_eq!(consumed, 32);
    }

    #[test]
    fn hex_display_roundtrip() {
        let hash = Hash::new(hex!(
            "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20"
        ));
        let text = hash.to_string();
        assert_eq!(
            text,
            "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20"
        );
        assert_eq!(text.parse::<Hash>().unwrap(), hash);
    }

    #[test]
    fn hex_parse_rejects_bad_input() {
        assert_eq!(
            "ab".parse::<Hash>(),
            Err(FromHexError::InvalidLength {
                expected: 64,
                actual: 2
            })
        );
        let bad = "zz".repeat(32);
        assert_eq!(bad.parse::<Hash>(), Err(FromHexError::InvalidDigit));
    }

    #[test]
    fn signature_defaults_to_zero() {
        let sig = Signature::default();
        assert!(sig.is_zero());
        assert_eq!(sig.as_bytes().len(), SIGNATURE_SIZE);
    }
}
