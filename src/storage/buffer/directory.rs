use std::collections::HashMap;

use super::FrameId;
use crate::error::{Error, Result};
use crate::storage::page::PageId;
use crate::storage::FileId;

/// Maps (file, page) pairs to the frame holding the page, so residency
/// lookups never scan the descriptor table. Keys use file identity, not
/// pathname.
pub struct PageDirectory {
    entries: HashMap<(FileId, PageId), FrameId>,
}

impl PageDirectory {
    /// Capacity is tuned to ~1.2x the pool size so the table stays sparse
    /// even at full residency.
    pub fn new(pool_size: usize) -> Self {
        PageDirectory { entries: HashMap::with_capacity(pool_size + pool_size / 5) }
    }

    /// Register the frame holding (file, page). The pool never installs the
    /// same key twice, so a duplicate is an internal fault.
    pub fn insert(&mut self, file_id: FileId, page_no: PageId, frame_no: FrameId) -> Result<()> {
        if self.entries.insert((file_id, page_no), frame_no).is_some() {
            return Err(Error::internal(format!(
                "duplicate directory entry for page {} of file {}",
                page_no, file_id
            )));
        }
        Ok(())
    }

    /// Resolve (file, page) to the frame holding it.
    pub fn lookup(&self, file_id: FileId, page_no: PageId) -> Result<FrameId> {
        match self.entries.get(&(file_id, page_no)) {
            Some(&frame_no) => Ok(frame_no),
            None => Err(Error::PageNotFound { file_id, page_no }),
        }
    }

    /// Drop the entry for (file, page), returning the frame it pointed at.
    pub fn remove(&mut self, file_id: FileId, page_no: PageId) -> Result<FrameId> {
        match self.entries.remove(&(file_id, page_no)) {
            Some(frame_no) => Ok(frame_no),
            None => Err(Error::PageNotFound { file_id, page_no }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
