use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use cn_core::RawBlock;
use cn_seria::to_bytes;

use crate::entry::BlockIndexEntry;
use crate::error::{ChainFileError, ChainFileResult};
use crate::{BLOCKS_FILENAME, INDEXES_FILENAME};

const LOG_INTERVAL: u64 = 10_000;

/// Appends raw block records to a `blocks.bin` / `blockindexes.bin` pair.
///
/// Existing files at the target directory are overwritten; exports restart
/// from genesis rather than resuming.
pub struct ChainWriter {
    blocks: BufWriter<File>,
    indexes: BufWriter<File>,
    offset: u64,
    count: u64,
}

impl ChainWriter {
    pub fn create(directory: &Path) -> ChainFileResult<Self> {
        let blocks = File::create(directory.join(BLOCKS_FILENAME))?;
        let indexes = File::create(directory.join(INDEXES_FILENAME))?;
        Ok(Self {
            blocks: BufWriter::new(blocks),
            indexes: BufWriter::new(indexes),
            offset: 0,
            count: 0,
        })
    }

    /// Append one record; returns the height it was stored at.
    pub fn append(&mut self, raw: &mut RawBlock) -> ChainFileResult<u64> {
        let height = self.count;
        let record = to_bytes(raw).map_err(|source| ChainFileError::Record { height, source })?;
        let mut entry = BlockIndexEntry {
            offset: self.offset,
            size: record.len() as u64,
        };
        let entry_bytes =
            to_bytes(&mut entry).map_err(|source| ChainFileError::Record { height, source })?;

        self.blocks.write_all(&record)?;
        self.indexes.write_all(&entry_bytes)?;
        self.offset += record.len() as u64;
        self.count += 1;

        if self.count % LOG_INTERVAL == 0 {
            info!(blocks = self.count, bytes = self.offset, "export progress");
        }
        Ok(height)
    }

    /// Flush both files and return the number of records written.
    pub fn finish(mut self) -> ChainFileResult<u64> {
        self.blocks.flush()?;
        self.indexes.flush()?;
        info!(blocks = self.count, bytes = self.offset, "export finished");
        Ok(self.count)
    }
}
