use std::fmt::{Display, Formatter};

use super::FrameId;
use crate::storage::page::{PageId, INVALID_PAGE_ID};
use crate::storage::FileRef;

/// Residency metadata for one frame. Descriptors are created once, at pool
/// construction, and live as long as the pool; only their bindings change.
pub struct FrameDesc {
    /// Immutable index of this descriptor's frame in the frame array.
    pub frame_no: FrameId,
    /// True iff the frame currently holds a resident page.
    pub valid: bool,
    /// Owning file of the resident page; None whenever the frame is empty.
    pub file: Option<FileRef>,
    /// Page id within the owning file, meaningful only while valid.
    pub page_no: PageId,
    /// Outstanding client borrows of the resident page.
    pub pin_cnt: u32,
    /// True iff the resident page was modified since it was read in.
    pub dirty: bool,
    /// Second-chance bit, set on access and cleared by the sweep.
    pub refbit: bool,
}

impl FrameDesc {
    pub fn new(frame_no: FrameId) -> Self {
        FrameDesc {
            frame_no,
            valid: false,
            file: None,
            page_no: INVALID_PAGE_ID,
            pin_cnt: 0,
            dirty: false,
            refbit: false,
        }
    }

    /// Bind the frame to a freshly loaded page, pinned once for the caller.
    /// Only this method turns a descriptor valid, and only after the frame
    /// contents are in place.
    pub fn set(&mut self, file: FileRef, page_no: PageId) {
        self.file = Some(file);
        self.page_no = page_no;
        self.valid = true;
        self.pin_cnt = 1;
        self.dirty = false;
        self.refbit = false;
    }

    /// Return the descriptor to its empty state.
    pub fn clear(&mut self) {
        self.valid = false;
        self.file = None;
        self.page_no = INVALID_PAGE_ID;
        self.pin_cnt = 0;
        self.dirty = false;
        self.refbit = false;
    }
}

impl Display for FrameDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let filename = match &self.file {
            Some(file) => {
                file.lock().map(|f| f.filename()).unwrap_or_else(|_| "<poisoned>".to_string())
            }
            None => "-".to_string(),
        };
        write!(
            f,
            "file:{} page_no:{} pin_cnt:{} dirty:{} valid:{} refbit:{}",
            filename, self.page_no, self.pin_cnt, self.dirty, self.valid, self.refbit
        )
    }
}
