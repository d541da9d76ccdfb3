//! Write-ahead log sketch (out of scope; see the crate root).
//!
//! An append-only record stream that would, in a real storage engine,
//! precede mutations to the hash engine's buckets so they could be replayed
//! after a crash. Only the record shape is sketched here; there is no
//! append path, no replay, and no recovery.

/// A single would-be WAL record. `Put`/`Delete` mirror the two mutating
/// operations `HashEngine` exposes; a real log would also need a commit
/// marker and a checksum, neither of which is sketched here.
#[allow(dead_code)]
pub enum Record {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// A sketch of a write-ahead log. No file or device backs this; it is a
/// placeholder for where that plumbing would live.
#[allow(dead_code)]
pub struct Wal {
    pending: Vec<Record>,
}

impl Wal {
    /// Construct an (in-memory, non-durable) WAL sketch.
    pub fn new() -> Wal {
        Wal { pending: Vec::new() }
    }
}

impl Default for Wal {
    fn default() -> Wal {
        Wal::new()
    }
}
