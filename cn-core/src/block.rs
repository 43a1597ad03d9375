//! Blocks and the raw pre-parsed block record.

use cn_seria::{seria_field, seria_vec, Seria, SeriaResult, Seriable};

use crate::hash::Hash;
use crate::transaction::Transaction;

/// Proof-of-work header.
///
/// The nonce transits as a raw 4-byte little-endian blob so that miners can
/// grind it in place without re-encoding the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub timestamp: u64,
    pub previous_block_hash: Hash,
    pub nonce: u32,
}

impl Seriable for BlockHeader {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "major_version", &mut self.major_version)?;
        seria_field(seria, "minor_version", &mut self.minor_version)?;
        seria_field(seria, "timestamp", &mut self.timestamp)?;
        seria_field(seria, "previous_block_hash", &mut self.previous_block_hash)?;

        let mut nonce_bytes = self.nonce.to_le_bytes();
        if seria.object_key("nonce")? {
            seria.seria_blob(&mut nonce_bytes)?;
        }
        if seria.is_input() {
            self.nonce = u32::from_le_bytes(nonce_bytes);
        }
        seria.end_object()
    }
}

/// A block as relayed and stored: header, the coinbase transaction in full,
/// and the ids of every other transaction in the block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub coinbase_transaction: Transaction,
    pub transaction_hashes: Vec<Hash>,
}

impl Seriable for Block {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "header", &mut self.header)?;
        seria_field(seria, "coinbase_transaction", &mut self.coinbase_transaction)?;
        seria.object_key("transaction_hashes")?;
        seria_vec(seria, &mut self.transaction_hashes)?;
        seria.end_object()
    }
}

/// A block together with the bodies of its transactions, both kept as
/// opaque encoded byte strings.
///
/// This is the record shape used for relaying freshly-mined blocks and for
/// the exported chain files: readers that only index or forward blocks never
/// pay for a full parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    pub block: Vec<u8>,
    pub transactions: Vec<Vec<u8>>,
}

impl Seriable for RawBlock {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "block", &mut self.block)?;
        seria.object_key("transactions")?;
        seria_vec(seria, &mut self.transactions)?;
        seria.end_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{CoinbaseInput, TransactionInput, TransactionPrefix};
    use cn_seria::{from_bytes_counted, to_bytes, DecodeLimits};
    use hex_literal::hex;

    fn sample_block(height: u64) -> Block {
        Block {
            header: BlockHeader {
                major_version: 1,
                minor_version: 0,
                timestamp: 1_530_000_000,
                previous_block_hash: Hash::new([0xcd; 32]),
                nonce: 0xdead_beef,
            },
            coinbase_transaction: Transaction {
                prefix: TransactionPrefix {
                    version: 1,
                    unlock_block_or_timestamp: height + 10,
                    inputs: vec![TransactionInput::Coinbase(CoinbaseInput {
                        block_index: height,
                    })],
                    outputs: Vec::new(),
                    extra: Vec::new(),
                },
                signatures: vec![Vec::new()],
            },
            transaction_hashes: vec![Hash::new([0x01; 32]), Hash::new([0x02; 32])],
        }
    }

    #[test]
    fn header_nonce_is_raw_little_endian() {
        let mut header = BlockHeader {
            major_version: 1,
            minor_version: 0,
            timestamp: 0,
            previous_block_hash: Hash::default(),
            nonce: 0xdead_beef,
        };
        let bytes = to_bytes(&mut header).unwrap();
        // 1, 0, 0, 32-byte hash, then the nonce bytes verbatim.
        assert_eq!(bytes.len(), 3 + 32 + 4);
        assert_eq!(&bytes[..3], hex!("01 00 00"));
        assert_eq!(&bytes[35..], hex!("ef be ad de"));

        let (decoded, consumed) =
            from_bytes_counted::<BlockHeader>(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn block_roundtrip() {
        let mut block = sample_block(42);
        let bytes = to_bytes(&mut block).unwrap();
        let (decoded, consumed) =
            from_bytes_counted::<Block>(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn raw_block_nests_byte_strings() {
        let mut raw = RawBlock {
            block: vec![0xaa, 0xbb],
            transactions: vec![vec![0x01], Vec::new(), vec![0x02, 0x03]],
        };
        let bytes = to_bytes(&mut raw).unwrap();
        assert_eq!(
            bytes,
            hex!("02 aa bb 03 01 01 00 02 02 03")
        );
        let (decoded, consumed) =
            from_bytes_counted::<RawBlock>(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, raw);
        assert_eq!(consumed, bytes.len());
    }
}
