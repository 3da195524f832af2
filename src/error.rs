use std::fmt::{Display, Formatter};

use config::ConfigError;
use serde::{Deserialize, Serialize};

use crate::storage::buffer::FrameId;
use crate::storage::page::PageId;
use crate::storage::FileId;

pub type Result<T> = std::result::Result<T, Error>;

// All except Internal are considered user-facing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Error {
    Internal(String),
    /// The directory has no entry for the requested (file, page) pair.
    PageNotFound { file_id: FileId, page_no: PageId },
    /// Every frame is valid and pinned, leaving the clock no candidate.
    BufferExceeded,
    /// A release was requested for a page nobody holds.
    PageNotPinned { filename: String, page_no: PageId, frame_no: FrameId },
    /// The operation needs the frame released, but a client still holds it.
    PagePinned { filename: String, page_no: PageId, frame_no: FrameId },
    /// A descriptor claims a file while marked invalid.
    BadBuffer { frame_no: FrameId, dirty: bool, valid: bool, refbit: bool },
    /// The file has no page with the requested id.
    InvalidPage { filename: String, page_no: PageId },
}

impl Error {
    pub fn internal<E: ToString>(msg: E) -> Error {
        Error::Internal(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Internal(s) => write!(f, "{}", s),
            Error::PageNotFound { file_id, page_no } => {
                write!(f, "page {} of file {} is not in the buffer pool", page_no, file_id)
            }
            Error::BufferExceeded => write!(f, "buffer exceeded, all frames are pinned"),
            Error::PageNotPinned { filename, page_no, frame_no } => {
                write!(f, "page {} of file {} in frame {} is not pinned", page_no, filename, frame_no)
            }
            Error::PagePinned { filename, page_no, frame_no } => {
                write!(f, "page {} of file {} in frame {} is still pinned", page_no, filename, frame_no)
            }
            Error::BadBuffer { frame_no, dirty, valid, refbit } => {
                write!(
                    f,
                    "frame {} has bad buffer state: dirty={} valid={} refbit={}",
                    frame_no, dirty, valid, refbit
                )
            }
            Error::InvalidPage { filename, page_no } => {
                write!(f, "file {} has no page {}", filename, page_no)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::internal(err)
    }
}

impl From<Box<bincode::ErrorKind>> for Error {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        Error::internal(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::internal(err)
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Error::internal(err)
    }
}
