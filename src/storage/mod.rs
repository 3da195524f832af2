use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::error::Result;
use crate::storage::page::{Page, PageId};

pub mod buffer;
pub mod disk;
pub mod memory;
pub mod page;

/// Stable identity of an open file. The buffer pool keys its directory on
/// file identity rather than pathname, so two opens of the same path are
/// distinct files as far as residency is concerned.
pub type FileId = u64;

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// Hand out the next process-wide file id.
pub(crate) fn next_file_id() -> FileId {
    NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A paged file: fixed-size pages addressed by page id.
///
/// The File trait is designed as `trait object` compatible, i.e., follow the
/// [object safety rules](https://doc.rust-lang.org/reference/items/traits.html#object-safety),
/// so callers can hold heterogeneous backends behind one `FileRef`.
pub trait File: Debug + Send {
    /// Stable identity of this open file.
    fn id(&self) -> FileId;

    /// The file name, for diagnostics in raised errors.
    fn filename(&self) -> String;

    /// Create a new page in the file and return it carrying its assigned id.
    /// Freed page ids may be handed out again.
    fn allocate_page(&mut self) -> Result<Page>;

    /// Read the page with the given id. Raise `Error::InvalidPage` when the
    /// file has no such page.
    fn read_page(&mut self, page_no: PageId) -> Result<Page>;

    /// Persist a page; the target id is carried by the page itself.
    fn write_page(&mut self, page: &Page) -> Result<()>;

    /// Remove a page from the file.
    fn delete_page(&mut self, page_no: PageId) -> Result<()>;
}

/// Shared handle to an open file. Cheap to clone; the buffer pool keeps a
/// clone in every descriptor whose frame holds one of the file's pages, so
/// eviction and flush can always reach the owning file.
pub type FileRef = Arc<Mutex<dyn File>>;

#[derive(Debug, PartialEq, Deserialize)]
pub enum FileType {
    Memory,
    Disk,
}

pub fn new_file(typ: FileType, path: &str) -> Result<FileRef> {
    match typ {
        FileType::Memory => Ok(Arc::new(Mutex::new(memory::MemFile::new(path)))),
        FileType::Disk => Ok(Arc::new(Mutex::new(disk::DiskFile::open(path)?))),
    }
}
