use cn_seria::{seria_field, Seria, SeriaResult, Seriable};

/// Location of one raw block inside `blocks.bin`.
///
/// The index file is the concatenation of these records in height order;
/// consecutive entries must tile the blocks file without gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockIndexEntry {
    pub offset: u64,
    pub size: u64,
}

impl BlockIndexEntry {
    /// Offset one past the record this entry describes.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

impl Seriable for BlockIndexEntry {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "offset", &mut self.offset)?;
        seria_field(seria, "size", &mut self.size)?;
        seria.end_object()
    }
}
