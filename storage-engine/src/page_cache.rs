//! Page-cache sketch (out of scope; see the crate root).
//!
//! This documents the shape a page cache sitting in front of the hash
//! engine's key space might take: a sector-keyed cache with a replacement
//! tracker sitting in front of a backing store, in the vein of a
//! `disk::cache`/`io::cache` pair. No eviction policy, no backing disk I/O,
//! and no wiring into `HashEngine` is implemented here; it is a placeholder
//! for a future sprint.

/// Options a real page cache would need, split out as configuration rather
/// than a per-call argument.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of pages the cache may hold before it would need to evict.
    pub capacity_pages: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config { capacity_pages: 256 }
    }
}

/// A sketch of a page cache. Intentionally unimplemented: constructing one
/// is the only operation provided, to keep the shape discoverable without
/// pretending any caching behavior exists yet.
#[allow(dead_code)]
pub struct PageCache {
    config: Config,
}

impl PageCache {
    /// Construct an (empty, non-functional) page cache sketch.
    pub fn new(config: Config) -> PageCache {
        PageCache { config }
    }
}
