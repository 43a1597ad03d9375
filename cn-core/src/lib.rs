//! Consensus payload types of the node and their wire traversals.
//!
//! Everything here transits the binary seria dialect; field orders and
//! variant tags are frozen network constants. Validation beyond wire shape
//! (proof of work, amounts, key images) belongs to the currency rules, not
//! to these types.

pub mod block;
pub mod hash;
pub mod transaction;

pub use block::{Block, BlockHeader, RawBlock};
pub use hash::{FromHexError, Hash, KeyImage, PublicKey, Signature, HASH_SIZE, SIGNATURE_SIZE};
pub use transaction::{
    CoinbaseInput, KeyInput, KeyOutput, OutputTarget, Transaction, TransactionInput,
    TransactionOutput, TransactionPrefix,
};
