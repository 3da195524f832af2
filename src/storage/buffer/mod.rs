//! The buffer pool is responsible for moving physical pages back and forth
//! from main memory to disk. It allows a DBMS to support databases that are
//! larger than the amount of memory available to the system.
//!
//! Three pieces: a descriptor table recording per-frame residency metadata,
//! a directory resolving (file, page) pairs to frames without scanning the
//! table, and the pool itself, which owns both plus the raw page storage and
//! runs the second-chance sweep when a frame has to be reused.

/// Index of a frame in the buffer pool, in range [0, pool_size).
pub type FrameId = usize;

pub mod bufferpool;
mod desc;
mod directory;
