use cn_seria::SeriaError;
use thiserror::Error;

/// Errors surfaced by the chain file layer.
#[derive(Debug, Error)]
pub enum ChainFileError {
    #[error("chain file io: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad record at height {height}: {source}")]
    Record {
        height: u64,
        #[source]
        source: SeriaError,
    },

    #[error("record at height {height} decodes to {consumed} bytes, index says {indexed}")]
    RecordLength {
        height: u64,
        consumed: u64,
        indexed: u64,
    },

    #[error("index entry {height} is not contiguous with its predecessor")]
    NonContiguousIndex { height: u64 },

    #[error("index entry {height} points past the end of the blocks file")]
    IndexOutOfBounds { height: u64 },

    #[error("height {height} is beyond the chain tip {tip}")]
    HeightOutOfRange { height: u64, tip: u64 },
}

pub type ChainFileResult<T> = Result<T, ChainFileError>;
