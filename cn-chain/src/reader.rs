use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use cn_core::RawBlock;
use cn_seria::{decode, DecodeLimits, InputStream, SliceStream};

use crate::entry::BlockIndexEntry;
use crate::error::{ChainFileError, ChainFileResult};
use crate::{BLOCKS_FILENAME, INDEXES_FILENAME};

/// Random and sequential access over an exported chain file pair.
///
/// The index is small (a handful of bytes per block) and is held in memory;
/// block records are read from disk on demand. Each record is sliced by its
/// index entry before decoding, so record concatenation never depends on the
/// decoder consuming its input exactly — but a record that decodes to fewer
/// bytes than its entry claims is still rejected.
#[derive(Debug)]
pub struct ChainReader {
    blocks: File,
    entries: Vec<BlockIndexEntry>,
    limits: DecodeLimits,
}

impl ChainReader {
    pub fn open(directory: &Path, limits: DecodeLimits) -> ChainFileResult<Self> {
        let index_bytes = fs::read(directory.join(INDEXES_FILENAME))?;
        let blocks = File::open(directory.join(BLOCKS_FILENAME))?;
        let blocks_len = blocks.metadata()?.len();

        let mut entries = Vec::new();
        let mut stream = SliceStream::new(&index_bytes);
        let mut expected_offset = 0u64;
        while stream.remaining() > 0 {
            let height = entries.len() as u64;
            let mut entry = BlockIndexEntry::default();
            decode(&mut stream, &mut entry, &limits)
                .map_err(|source| ChainFileError::Record { height, source })?;
            if entry.offset != expected_offset {
                return Err(ChainFileError::NonContiguousIndex { height });
            }
            if entry.end() > blocks_len {
                return Err(ChainFileError::IndexOutOfBounds { height });
            }
            expected_offset = entry.end();
            entries.push(entry);
        }

        debug!(blocks = entries.len(), bytes = blocks_len, "opened chain files");
        Ok(Self {
            blocks,
            entries,
            limits,
        })
    }

    /// Number of records in the pair.
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read and decode the record at `height`.
    pub fn get(&mut self, height: u64) -> ChainFileResult<RawBlock> {
        let entry = *self
            .entries
            .get(height as usize)
            .ok_or(ChainFileError::HeightOutOfRange {
                height,
                tip: self.entries.len().saturating_sub(1) as u64,
            })?;

        let mut record = vec![0u8; entry.size as usize];
        self.blocks.seek(SeekFrom::Start(entry.offset))?;
        self.blocks.read_exact(&mut record)?;

        let mut stream = SliceStream::new(&record);
        let mut raw = RawBlock::default();
        decode(&mut stream, &mut raw, &self.limits)
            .map_err(|source| ChainFileError::Record { height, source })?;
        if stream.consumed() as u64 != entry.size {
            return Err(ChainFileError::RecordLength {
                height,
                consumed: stream.consumed() as u64,
                indexed: entry.size,
            });
        }
        Ok(raw)
    }

    /// Iterate every record from genesis to tip.
    pub fn iter(&mut self) -> ChainIter<'_> {
        ChainIter {
            reader: self,
            next: 0,
        }
    }
}

/// Sequential record iterator; yields `(height, record)` pairs.
pub struct ChainIter<'a> {
    reader: &'a mut ChainReader,
    next: u64,
}

impl Iterator for ChainIter<'_> {
    type Item = ChainFileResult<(u64, RawBlock)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.reader.len() {
            return None;
        }
        let height = self.next;
        self.next += 1;
        Some(self.reader.get(height).map(|raw| (height, raw)))
    }
}
