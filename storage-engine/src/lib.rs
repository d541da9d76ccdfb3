//! A learning codebase for a storage engine.
//!
//! [`hash_engine`] is the only subsystem here with real engineering content
//! and test coverage: a concurrent, incrementally-resizing hash table. The
//! sibling modules in this crate ([`page_cache`], [`wal`], and [`fsck`]) are
//! sketches of the surrounding storage-engine shape, carried the way a disk
//! cache, allocator, and checksum machinery sit alongside a core hash map in
//! a layered storage codebase: documentation of intent, not implemented or
//! tested subsystems.

pub use hash_engine::{Error, HashEngine, Stats};

pub mod fsck;
pub mod page_cache;
pub mod wal;
