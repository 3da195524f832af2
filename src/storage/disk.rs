use std::fs::{File as OsFile, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::page::{Page, PageId, INVALID_PAGE_ID, PAGE_SIZE};
use crate::storage::{next_file_id, File, FileId};

/// On-disk file header, bincode-encoded into block 0. Freed pages form a
/// chain threaded through their leading bytes, headed by `first_free_page`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FileHeader {
    num_pages: u64,
    first_free_page: PageId,
}

/// A paged file backed by one OS file. Block 0 holds the header; page `p`
/// lives at byte offset `(p + 1) * PAGE_SIZE`.
///
/// Reading a page that sits on the free chain is not detected: the caller
/// gets whatever bytes the chain left behind. Page ids are only meaningful
/// between allocate_page and delete_page.
#[derive(Debug)]
pub struct DiskFile {
    id: FileId,
    path: String,
    file: OsFile,
    header: FileHeader,
}

impl DiskFile {
    /// Open the file at `path`, creating it with an empty header when absent.
    pub fn open(path: &str) -> Result<DiskFile> {
        let mut file = OpenOptions::new().read(true).write(true).create(true).open(path)?;
        let len = file.metadata()?.len();
        let header = if len == 0 {
            let header = FileHeader { num_pages: 0, first_free_page: INVALID_PAGE_ID };
            write_block(&mut file, 0, &bincode::serialize(&header)?)?;
            header
        } else {
            let block = read_block(&mut file, 0)?;
            bincode::deserialize(&block)?
        };
        Ok(DiskFile { id: next_file_id(), path: path.to_string(), file, header })
    }

    fn write_header(&mut self) -> Result<()> {
        let bytes = bincode::serialize(&self.header)?;
        write_block(&mut self.file, 0, &bytes)
    }

    /// Translate a page id into its block number, bounds-checked.
    fn block_no(&self, page_no: PageId) -> Result<u64> {
        let invalid =
            || Error::InvalidPage { filename: self.path.clone(), page_no };
        let n = u64::try_from(page_no).map_err(|_| invalid())?;
        if n >= self.header.num_pages {
            return Err(invalid());
        }
        Ok(n + 1)
    }
}

impl File for DiskFile {
    fn id(&self) -> FileId {
        self.id
    }

    fn filename(&self) -> String {
        self.path.clone()
    }

    fn allocate_page(&mut self) -> Result<Page> {
        let page_no = if self.header.first_free_page != INVALID_PAGE_ID {
            // pop the free chain: the freed page's leading bytes hold the next link
            let page_no = self.header.first_free_page;
            let block = read_block(&mut self.file, page_no as u64 + 1)?;
            self.header.first_free_page = bincode::deserialize(&block)?;
            page_no
        } else {
            let page_no = self.header.num_pages as PageId;
            self.header.num_pages += 1;
            page_no
        };
        let page = Page::new(page_no);
        write_block(&mut self.file, page_no as u64 + 1, page.data())?;
        self.write_header()?;
        Ok(page)
    }

    fn read_page(&mut self, page_no: PageId) -> Result<Page> {
        let block_no = self.block_no(page_no)?;
        let data = read_block(&mut self.file, block_no)?;
        Ok(Page { page_no, data })
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let block_no = self.block_no(page.page_number())?;
        write_block(&mut self.file, block_no, page.data())
    }

    fn delete_page(&mut self, page_no: PageId) -> Result<()> {
        let block_no = self.block_no(page_no)?;
        // thread the page onto the free chain
        let link = bincode::serialize(&self.header.first_free_page)?;
        write_block(&mut self.file, block_no, &link)?;
        self.header.first_free_page = page_no;
        self.write_header()
    }
}

fn read_block(file: &mut OsFile, block_no: u64) -> Result<Vec<u8>> {
    let mut buf = vec![0; PAGE_SIZE];
    file.seek(SeekFrom::Start(block_no * PAGE_SIZE as u64))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// Write one block, zero-padding short payloads to the full block size.
fn write_block(file: &mut OsFile, block_no: u64, bytes: &[u8]) -> Result<()> {
    debug_assert!(bytes.len() <= PAGE_SIZE);
    let mut buf = vec![0; PAGE_SIZE];
    buf[..bytes.len()].copy_from_slice(bytes);
    file.seek(SeekFrom::Start(block_no * PAGE_SIZE as u64))?;
    file.write_all(&buf)?;
    Ok(())
}
