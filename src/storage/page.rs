use std::ops::Deref;
use std::sync::RwLock;

/// Identifier of a page within a file.
pub type PageId = i64;

/// Size of a data page in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Page id carried by frames and descriptors that hold no page.
pub(crate) const INVALID_PAGE_ID: PageId = -1;

/// An opaque, fixed-size, copyable container of file data, tagged with the
/// page id it was allocated under. The buffer pool and the file layer move
/// pages around without interpreting their bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub(crate) page_no: PageId,
    pub(crate) data: Vec<u8>,
}

impl Page {
    /// Allocate a zeroed page in memory with the given id.
    pub fn new(page_no: PageId) -> Self {
        Page { page_no, data: vec![0; PAGE_SIZE] }
    }

    /// The id this page was allocated under.
    pub fn page_number(&self) -> PageId {
        self.page_no
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Frame acts as the container of one buffer-pool slot, wrapping the resident
/// page for shared access protection. Clients hold an `Arc<Frame>` clone while
/// the slot is pinned and reach the bytes through the lock; the scheduling
/// model stays single-threaded cooperative.
pub struct Frame {
    inner: RwLock<Page>,
}

impl Frame {
    /// A fresh, empty slot holding a zeroed page with no identity.
    pub(crate) fn new() -> Self {
        Frame { inner: RwLock::new(Page::new(INVALID_PAGE_ID)) }
    }
}

impl Deref for Frame {
    type Target = RwLock<Page>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
