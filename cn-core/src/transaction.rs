//! Transactions and their wire traversals.
//!
//! Field order and variant tags below are consensus constants: changing
//! either forks the network. New fields may only be appended behind an
//! option or a new variant tag.

use cn_seria::{
    seria_field, seria_fixed_vec, seria_vec, Seria, SeriaError, SeriaResult, Seriable,
};

use crate::hash::{KeyImage, PublicKey, Signature};

/// Wire tag of [`TransactionInput::Coinbase`].
pub const TAG_INPUT_COINBASE: u64 = 0xff;

/// Wire tag of [`TransactionInput::Key`].
pub const TAG_INPUT_KEY: u64 = 0x02;

/// Wire tag of [`OutputTarget::Key`].
pub const TAG_OUTPUT_KEY: u64 = 0x02;

/// The input that mints the block subsidy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoinbaseInput {
    pub block_index: u64,
}

impl Seriable for CoinbaseInput {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "block_index", &mut self.block_index)?;
        seria.end_object()
    }
}

/// An input spending previously-created outputs through a ring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub amount: u64,
    /// Delta-compressed global indexes of the ring members. One signature
    /// per entry is demanded in the enclosing transaction.
    pub output_indexes: Vec<u64>,
    pub key_image: KeyImage,
}

impl Seriable for KeyInput {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "amount", &mut self.amount)?;
        seria.object_key("output_indexes")?;
        seria_vec(seria, &mut self.output_indexes)?;
        seria_field(seria, "key_image", &mut self.key_image)?;
        seria.end_object()
    }
}

/// Transaction input: a closed tagged variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInput {
    Coinbase(CoinbaseInput),
    Key(KeyInput),
}

impl Default for TransactionInput {
    fn default() -> Self {
        Self::Coinbase(CoinbaseInput::default())
    }
}

impl TransactionInput {
    /// Number of ring signatures this input demands in the enclosing
    /// transaction.
    pub fn signature_count(&self) -> usize {
        match self {
            Self::Coinbase(_) => 0,
            Self::Key(input) => input.output_indexes.len(),
        }
    }
}

impl Seriable for TransactionInput {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        if seria.is_input() {
            let mut tag = 0u64;
            seria.seria_varint(&mut tag)?;
            *self = match tag {
                TAG_INPUT_COINBASE => Self::Coinbase(CoinbaseInput::default()),
                TAG_INPUT_KEY => Self::Key(KeyInput::default()),
                tag => {
                    return Err(SeriaError::UnknownTag {
                        tag,
                        name: "TransactionInput",
                    })
                }
            };
        } else {
            let mut tag = match self {
                Self::Coinbase(_) => TAG_INPUT_COINBASE,
                Self::Key(_) => TAG_INPUT_KEY,
            };
            seria.seria_varint(&mut tag)?;
        }
        match self {
            Self::Coinbase(input) => input.seria(seria),
            Self::Key(input) => input.seria(seria),
        }
    }
}

/// The spendable part of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    Key(KeyOutput),
}

/// Output paying to a one-time key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutput {
    pub public_key: PublicKey,
}

impl Seriable for KeyOutput {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "public_key", &mut self.public_key)?;
        seria.end_object()
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::Key(KeyOutput::default())
    }
}

impl Seriable for OutputTarget {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        if seria.is_input() {
            let mut tag = 0u64;
            seria.seria_varint(&mut tag)?;
            *self = match tag {
                TAG_OUTPUT_KEY => Self::Key(KeyOutput::default()),
                tag => {
                    return Err(SeriaError::UnknownTag {
                        tag,
                        name: "OutputTarget",
                    })
                }
            };
        } else {
            let mut tag = match self {
                Self::Key(_) => TAG_OUTPUT_KEY,
            };
            seria.seria_varint(&mut tag)?;
        }
        match self {
            Self::Key(output) => output.seria(seria),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOutput {
    pub amount: u64,
    pub target: OutputTarget,
}

impl Seriable for TransactionOutput {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "amount", &mut self.amount)?;
        seria_field(seria, "target", &mut self.target)?;
        seria.end_object()
    }
}

/// Everything of a transaction except its signatures; this is the part that
/// is hashed for the transaction id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPrefix {
    pub version: u8,
    /// Block index or unix timestamp before which the outputs stay locked.
    pub unlock_block_or_timestamp: u64,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub extra: Vec<u8>,
}

impl Seriable for TransactionPrefix {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "version", &mut self.version)?;
        seria_field(
            seria,
            "unlock_block_or_timestamp",
            &mut self.unlock_block_or_timestamp,
        )?;
        seria.object_key("inputs")?;
        seria_vec(seria, &mut self.inputs)?;
        seria.object_key("outputs")?;
        seria_vec(seria, &mut self.outputs)?;
        seria_field(seria, "extra", &mut self.extra)?;
        seria.end_object()
    }
}

/// A full transaction: prefix plus ring signatures.
///
/// Both signature dimensions are fixed-size on the wire. The outer count is
/// the number of inputs, the inner count is what each input demands; neither
/// is serialized. The decoder therefore derives the layout entirely from the
/// already-decoded inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub prefix: TransactionPrefix,
    pub signatures: Vec<Vec<Signature>>,
}

impl Seriable for Transaction {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        self.prefix.seria(seria)?;

        seria.object_key("signatures")?;
        let mut outer = self.prefix.inputs.len();
        seria.begin_array(&mut outer, true)?;
        if seria.is_input() {
            self.signatures.clear();
            self.signatures.reserve(outer);
            for index in 0..outer {
                let expected = self.prefix.inputs[index].signature_count();
                let mut signatures = Vec::new();
                seria_fixed_vec(seria, &mut signatures, expected)?;
                self.signatures.push(signatures);
            }
        } else {
            debug_assert_eq!(self.signatures.len(), outer);
            for (input, signatures) in self.prefix.inputs.iter().zip(self.signatures.iter_mut()) {
                seria_fixed_vec(seria, signatures, input.signature_count())?;
            }
        }
        seria.end_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_seria::{from_bytes, from_bytes_counted, to_bytes, DecodeLimits};
    use hex_literal::hex;

    fn coinbase(block_index: u64) -> Transaction {
        Transaction {
            prefix: TransactionPrefix {
                version: 1,
                unlock_block_or_timestamp: block_index + 10,
                inputs: vec![TransactionInput::Coinbase(CoinbaseInput { block_index })],
                outputs: vec![TransactionOutput {
                    amount: 1_000_000,
                    target: OutputTarget::Key(KeyOutput {
                        public_key: PublicKey::new([0x22; 32]),
                    }),
                }],
                extra: vec![0x01, 0x02, 0x03],
            },
            signatures: vec![Vec::new()],
        }
    }

    #[test]
    fn coinbase_known_bytes() {
        let mut tx = coinbase(5);
        let bytes = to_bytes(&mut tx).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&hex!("01 0f")); // version, unlock 15
        expected.extend_from_slice(&hex!("01 ff 01 05")); // one input, tag 0xff, height 5
        expected.extend_from_slice(&hex!("01")); // one output
        expected.extend_from_slice(&hex!("c0 84 3d")); // amount, one million
        expected.extend_from_slice(&hex!("02")); // output tag
        expected.extend_from_slice(&[0x22; 32]); // one-time key
        expected.extend_from_slice(&hex!("03 01 02 03")); // extra
        // No signature bytes at all for a coinbase.
        assert_eq!(bytes, expected);

        let (decoded, consumed) =
            from_bytes_counted::<Transaction>(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn key_input_signatures_are_fixed_size() {
        let mut tx = Transaction {
            prefix: TransactionPrefix {
                version: 1,
                unlock_block_or_timestamp: 0,
                inputs: vec![TransactionInput::Key(KeyInput {
                    amount: 700,
                    output_indexes: vec![4, 7],
                    key_image: KeyImage::new([0x33; 32]),
                })],
                outputs: Vec::new(),
                extra: Vec::new(),
            },
            signatures: vec![vec![
                Signature::new([0x44; 64]),
                Signature::new([0x55; 64]),
            ]],
        };
        let bytes = to_bytes(&mut tx).unwrap();

        // Two signatures follow the prefix with no count prefix.
        let prefix_len = bytes.len() - 2 * 64;
        assert_eq!(&bytes[prefix_len..prefix_len + 64], &[0x44; 64][..]);
        assert_eq!(&bytes[prefix_len + 64..], &[0x55; 64][..]);

        let (decoded, consumed) =
            from_bytes_counted::<Transaction>(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn unknown_input_tag_rejected() {
        // One input with tag 0x7b.
        let bytes = hex!("01 00 01 7b");
        let err = from_bytes::<Transaction>(&bytes, &DecodeLimits::default()).unwrap_err();
        assert_eq!(
            err,
            SeriaError::UnknownTag {
                tag: 0x7b,
                name: "TransactionInput"
            }
        );
    }

    #[test]
    fn truncated_signature_is_unexpected_end() {
        let mut tx = Transaction {
            prefix: TransactionPrefix {
                version: 1,
                unlock_block_or_timestamp: 0,
                inputs: vec![TransactionInput::Key(KeyInput {
                    amount: 1,
                    output_indexes: vec![9],
                    key_image: KeyImage::default(),
                })],
                outputs: Vec::new(),
                extra: Vec::new(),
            },
            signatures: vec![vec![Signature::new([0x66; 64])]],
        };
        let bytes = to_bytes(&mut tx).unwrap();
        let err =
            from_bytes::<Transaction>(&bytes[..bytes.len() - 1], &DecodeLimits::default())
                .unwrap_err();
        assert_eq!(err.kind(), cn_seria::ErrorKind::UnexpectedEnd);
    }
}
