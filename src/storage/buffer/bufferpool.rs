use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::debug;

use super::desc::FrameDesc;
use super::directory::PageDirectory;
use super::FrameId;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::page::{Frame, PageId};
use crate::storage::FileRef;

/// The buffer pool mediates between higher-level code and the paged file
/// layer. It owns a fixed number of page-sized frames and guarantees that any
/// page a client currently holds is resident, pinned, and mapped to exactly
/// one frame.
///
/// A page handed out by `read_page`/`alloc_page` stays valid until the
/// matching `unpin_page`; clients release every pin they take. Dropping the
/// pool releases its memory but does not write dirty pages back, callers
/// flush each file first.
pub struct BufferPool {
    pool_size: usize,
    /// Raw page storage, one page-sized slot per frame. Clients hold Arc
    /// clones of a slot while the matching descriptor is pinned.
    frames: Vec<Arc<Frame>>,
    /// Residency metadata, index-aligned with `frames`.
    descs: Vec<FrameDesc>,
    /// (file, page) -> frame index for every resident page.
    directory: PageDirectory,
    /// Cursor of the second-chance sweep, advanced by alloc_buf.
    clock_hand: usize,
}

impl BufferPool {
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "buffer pool needs at least one frame");
        let mut frames = Vec::with_capacity(pool_size);
        let mut descs = Vec::with_capacity(pool_size);
        for frame_no in 0..pool_size {
            frames.push(Arc::new(Frame::new()));
            descs.push(FrameDesc::new(frame_no));
        }
        // start one step before frame 0 so the first advance lands on it
        let clock_hand = pool_size - 1;
        BufferPool { pool_size, frames, descs, directory: PageDirectory::new(pool_size), clock_hand }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(config.pool_size)
    }

    /// Hand out the page with the given id, pinned. On a hit the resident
    /// frame is pinned once more and its refbit is set; on a miss the page is
    /// read from the file into a frame claimed from the sweep.
    pub fn read_page(&mut self, file: &FileRef, page_no: PageId) -> Result<Arc<Frame>> {
        let file_id = file.lock()?.id();
        match self.directory.lookup(file_id, page_no) {
            Ok(frame_no) => {
                let desc = &mut self.descs[frame_no];
                desc.refbit = true;
                desc.pin_cnt += 1;
                Ok(Arc::clone(&self.frames[frame_no]))
            }
            Err(Error::PageNotFound { .. }) => {
                let frame_no = self.alloc_buf()?;
                let page = file.lock()?.read_page(page_no)?;
                *self.frames[frame_no].write()? = page;
                self.directory.insert(file_id, page_no, frame_no)?;
                self.descs[frame_no].set(Arc::clone(file), page_no);
                debug!("read page {} of file {} into frame {}", page_no, file_id, frame_no);
                Ok(Arc::clone(&self.frames[frame_no]))
            }
            Err(err) => Err(err),
        }
    }

    /// Create a new page in the file and bring it into the pool, pinned.
    /// Returns the assigned page id along with the frame.
    pub fn alloc_page(&mut self, file: &FileRef) -> Result<(PageId, Arc<Frame>)> {
        let page = file.lock()?.allocate_page()?;
        let page_no = page.page_number();
        let frame_no = self.alloc_buf()?;
        let file_id = file.lock()?.id();
        *self.frames[frame_no].write()? = page;
        self.directory.insert(file_id, page_no, frame_no)?;
        self.descs[frame_no].set(Arc::clone(file), page_no);
        debug!("allocated page {} of file {} in frame {}", page_no, file_id, frame_no);
        Ok((page_no, Arc::clone(&self.frames[frame_no])))
    }

    /// Release one pin on the page. With `dirty` the resident page is marked
    /// modified; the mark is sticky until the next write-back.
    pub fn unpin_page(&mut self, file: &FileRef, page_no: PageId, dirty: bool) -> Result<()> {
        let file_id = file.lock()?.id();
        let frame_no = self.directory.lookup(file_id, page_no)?;
        if self.descs[frame_no].pin_cnt == 0 {
            let filename = file.lock()?.filename();
            return Err(Error::PageNotPinned { filename, page_no, frame_no });
        }
        let desc = &mut self.descs[frame_no];
        desc.pin_cnt -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    /// Write back every dirty page of the file and return all of its frames
    /// to the free pool. A pinned page aborts the flush with `PagePinned`;
    /// frames already visited stay flushed.
    pub fn flush_file(&mut self, file: &FileRef) -> Result<()> {
        let file_id = file.lock()?.id();
        debug!("flushing file {}", file_id);
        for frame_no in 0..self.pool_size {
            let owner = match &self.descs[frame_no].file {
                Some(owner) => owner.lock()?.id(),
                None => continue,
            };
            if owner != file_id {
                continue;
            }
            let desc = &self.descs[frame_no];
            if desc.pin_cnt > 0 {
                let filename = file.lock()?.filename();
                return Err(Error::PagePinned { filename, page_no: desc.page_no, frame_no });
            }
            if !desc.valid {
                return Err(Error::BadBuffer {
                    frame_no,
                    dirty: desc.dirty,
                    valid: desc.valid,
                    refbit: desc.refbit,
                });
            }
            if desc.dirty {
                let page = self.frames[frame_no].read()?;
                file.lock()?.write_page(&page)?;
                drop(page);
                debug!("wrote back dirty page {} of file {} from frame {}",
                    self.descs[frame_no].page_no, file_id, frame_no);
                self.descs[frame_no].dirty = false;
            }
            let page_no = self.descs[frame_no].page_no;
            self.directory.remove(file_id, page_no)?;
            self.descs[frame_no].clear();
        }
        Ok(())
    }

    /// Delete a page from the file. When the page is resident its frame is
    /// returned to the free pool first; a pinned page is refused with
    /// `PagePinned` before anything is touched.
    pub fn dispose_page(&mut self, file: &FileRef, page_no: PageId) -> Result<()> {
        let file_id = file.lock()?.id();
        match self.directory.lookup(file_id, page_no) {
            Ok(frame_no) => {
                if self.descs[frame_no].pin_cnt > 0 {
                    let filename = file.lock()?.filename();
                    return Err(Error::PagePinned { filename, page_no, frame_no });
                }
                self.directory.remove(file_id, page_no)?;
                self.descs[frame_no].clear();
            }
            Err(Error::PageNotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        file.lock()?.delete_page(page_no)
    }

    fn advance_clock(&mut self) {
        self.clock_hand = (self.clock_hand + 1) % self.pool_size;
    }

    /// Claim a frame for reuse with the second-chance sweep. Invalid frames
    /// are taken as-is; a set refbit buys the frame one more sweep; an
    /// unreferenced, unpinned frame is evicted: its directory entry goes
    /// first, then the dirty write-back, then the descriptor reset, so an
    /// error mid-eviction leaves the frame empty and the directory
    /// consistent.
    ///
    /// Every pinned frame passed decrements a budget that starts at the pool
    /// size; exhausting it means every frame is valid and pinned, which
    /// raises `BufferExceeded`. Clearing refbits does not touch the budget: a
    /// pool of referenced, unpinned frames completes one sweep and succeeds
    /// on the next.
    fn alloc_buf(&mut self) -> Result<FrameId> {
        let mut pinned_left = self.pool_size;
        loop {
            self.advance_clock();
            let hand = self.clock_hand;
            if !self.descs[hand].valid {
                return Ok(hand);
            }
            if self.descs[hand].refbit {
                self.descs[hand].refbit = false;
                continue;
            }
            if self.descs[hand].pin_cnt > 0 {
                pinned_left -= 1;
                if pinned_left == 0 {
                    return Err(Error::BufferExceeded);
                }
                continue;
            }

            // victim found: unhook it from the directory, write it back if
            // dirty, then hand the cleared frame to the caller. a valid
            // descriptor always carries its owning file, unwrap cannot panic.
            let file = self.descs[hand].file.clone().unwrap();
            let page_no = self.descs[hand].page_no;
            let file_id = file.lock()?.id();
            self.directory.remove(file_id, page_no)?;
            if self.descs[hand].dirty {
                let page = self.frames[hand].read()?;
                file.lock()?.write_page(&page)?;
                drop(page);
                debug!("wrote back dirty page {} of file {} from frame {}", page_no, file_id, hand);
            }
            self.descs[hand].clear();
            debug!("evicted page {} of file {} from frame {}", page_no, file_id, hand);
            return Ok(hand);
        }
    }
}

impl Display for BufferPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut valid_frames = 0;
        for desc in &self.descs {
            writeln!(f, "frame {}: {}", desc.frame_no, desc)?;
            if desc.valid {
                valid_frames += 1;
            }
        }
        write!(f, "total valid frames: {}", valid_frames)
    }
}
