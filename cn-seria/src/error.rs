use thiserror::Error;

/// Coarse classification of a [`SeriaError`], mirroring the four failure
/// categories of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The decoder rejected the byte sequence.
    MalformedInput,
    /// The input stream ended mid-field.
    UnexpectedEnd,
    /// A bounded output sink refused a write.
    OutOfSpace,
    /// Programmer error in driving the visitor.
    InvalidUsage,
}

/// Error returned when a value cannot be encoded to or decoded from the
/// binary wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SeriaError {
    #[error("seria: unexpected end of input (needed {needed}, remaining {remaining})")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("seria: non-minimal varint encoding")]
    NonMinimalVarint,

    #[error("seria: varint does not fit in a {width}-bit integer")]
    VarintOverflow { width: u32 },

    #[error("seria: varint longer than {max} bytes", max = crate::varint::MAX_VARINT_LEN)]
    VarintTooLong,

    #[error("seria: invalid boolean byte 0x{0:02x}")]
    InvalidBool(u8),

    #[error("seria: invalid utf-8 in string field")]
    InvalidUtf8,

    #[error("seria: unknown tag {tag} for variant {name}")]
    UnknownTag { tag: u64, name: &'static str },

    #[error("seria: encoded length {len} exceeds limit {max}")]
    LengthOverLimit { len: u64, max: u64 },

    #[error("seria: encoded count {count} exceeds limit {max}")]
    CountOverLimit { count: u64, max: u64 },

    #[error("seria: encoded length {len} exceeds remaining input {remaining}")]
    LengthOverInput { len: u64, remaining: usize },

    #[error("seria: output sink out of space (needed {needed}, capacity left {left})")]
    OutOfSpace { needed: usize, left: usize },

    #[error("seria: invalid visitor usage: {0}")]
    InvalidUsage(&'static str),
}

impl SeriaError {
    /// The contract category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedEnd { .. } => ErrorKind::UnexpectedEnd,
            Self::NonMinimalVarint
            | Self::VarintOverflow { .. }
            | Self::VarintTooLong
            | Self::InvalidBool(_)
            | Self::InvalidUtf8
            | Self::UnknownTag { .. }
            | Self::LengthOverLimit { .. }
            | Self::CountOverLimit { .. }
            | Self::LengthOverInput { .. } => ErrorKind::MalformedInput,
            Self::OutOfSpace { .. } => ErrorKind::OutOfSpace,
            Self::InvalidUsage(_) => ErrorKind::InvalidUsage,
        }
    }
}

/// Result type used throughout the codec.
pub type SeriaResult<T> = core::result::Result<T, SeriaError>;
