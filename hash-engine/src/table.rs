//! Linear-probing scan over a single bucket array (§4.3).
//!
//! `Table` is the unlocked, single-array half of the engine (the equivalent
//! of `chashmap`'s inner `Table<K, V>`, minus the RW-lock around the whole
//! array; the engine holds a snapshot `Arc<Table>` instead, see
//! `engine.rs`/`resize.rs`).

use crate::bucket::{try_alloc, Bucket, Locked, State};
use crate::error::Error;

/// The outcome of a successful insert (§4.3 Insert).
pub(crate) enum InsertOutcome {
    /// A previously-unused or tombstoned slot was claimed.
    Inserted,
    /// An existing bucket with the same key had its value replaced in
    /// place; the key buffer was left untouched.
    Replaced { old_value_len: usize },
}

pub(crate) struct Table {
    buckets: Vec<Bucket>,
}

impl Table {
    /// Allocate a table of exactly `count` EMPTY buckets.
    pub(crate) fn new(count: usize) -> Result<Table, Error> {
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(count)
            .map_err(|_| Error::OutOfMemory)?;
        buckets.extend((0..count).map(|_| Bucket::empty()));
        Ok(Table { buckets })
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    fn first_index(&self, key: &[u8], k0: u64, k1: u64) -> usize {
        let digest = siphash::hash(k0, k1, key);
        (digest % self.buckets.len() as u64) as usize
    }

    /// Lookup (§4.3 Lookup). `None` means the scan hit an EMPTY bucket or
    /// exhausted a full sweep without a match.
    pub(crate) fn lookup(&self, key: &[u8], k0: u64, k1: u64) -> Option<Vec<u8>> {
        let count = self.buckets.len();
        let h = self.first_index(key, k0, k1);

        for i in 0..count {
            let bucket = &self.buckets[(h + i) % count];
            match bucket.state() {
                State::Empty => return None,
                State::Tombstone => {}
                State::Occupied => {
                    if let Some(value) = bucket.read_value_if_key_matches(key) {
                        return Some(value);
                    }
                    // Key didn't match, or the bucket raced away from
                    // Occupied between the prescan and the lock: either way,
                    // keep probing.
                }
            }
        }

        None
    }

    /// Insert (§4.3 Insert): one scan, holding each candidate bucket's lock
    /// for as long as it takes to decide what to do with it, so that
    /// selecting the insertion slot and writing into it are one atomic
    /// step (mirroring `chashmap::Table::lookup_or_free`, which returns the
    /// held write guard for the chosen bucket rather than re-deriving it
    /// from an unlocked prescan). The first tombstone's lock is held across
    /// the rest of the scan so it can be reclaimed if the key isn't found
    /// further along; a prescan-then-relock design would let two concurrent
    /// inserts both pick the same free slot and clobber each other.
    pub(crate) fn insert(&self, key: &[u8], value: &[u8], k0: u64, k1: u64) -> Result<InsertOutcome, Error> {
        let count = self.buckets.len();
        let h = self.first_index(key, k0, k1);
        let mut first_tombstone: Option<Locked<'_>> = None;

        for i in 0..count {
            let idx = (h + i) % count;
            let guard = self.buckets[idx].lock();

            if guard.key_matches(key) {
                let value_buf = try_alloc(value)?;
                let old_len = guard.replace_value(value_buf);
                return Ok(InsertOutcome::Replaced { old_value_len: old_len });
            }

            if guard.is_empty() {
                let key_buf = try_alloc(key)?;
                let value_buf = try_alloc(value)?;
                if let Some(target) = first_tombstone {
                    drop(guard);
                    target.occupy(key_buf, value_buf);
                } else {
                    guard.occupy(key_buf, value_buf);
                }
                return Ok(InsertOutcome::Inserted);
            }

            if guard.is_tombstone() && first_tombstone.is_none() {
                first_tombstone = Some(guard);
            }
            // Occupied with a different key, or a later tombstone once a
            // first one is already held: drop this lock and keep probing.
        }

        // Full sweep, no EMPTY seen: the table is saturated with
        // OCCUPIED/TOMBSTONE. Reclaim the first tombstone if we found one.
        if let Some(target) = first_tombstone {
            let key_buf = try_alloc(key)?;
            let value_buf = try_alloc(value)?;
            target.occupy(key_buf, value_buf);
            return Ok(InsertOutcome::Inserted);
        }

        Err(Error::NoSpace)
    }

    /// Delete (§4.3 Delete). Returns the freed `(key_len, value_len)`.
    pub(crate) fn delete(&self, key: &[u8], k0: u64, k1: u64) -> Option<(usize, usize)> {
        let count = self.buckets.len();
        let h = self.first_index(key, k0, k1);

        for i in 0..count {
            let bucket = &self.buckets[(h + i) % count];
            match bucket.state() {
                State::Empty => return None,
                State::Tombstone => {}
                State::Occupied => {
                    if let Some(freed) = bucket.tombstone_if_matches(key) {
                        return Some(freed);
                    }
                }
            }
        }

        None
    }

    /// Bucket at a raw index, used by the migrator to walk the old array
    /// without re-hashing.
    pub(crate) fn bucket_at(&self, idx: usize) -> &Bucket {
        &self.buckets[idx]
    }

    /// True if any bucket is still Occupied. Used when finalizing a resize
    /// to confirm the old array is actually drained before it is dropped.
    pub(crate) fn any_occupied(&self) -> bool {
        self.buckets.iter().any(|b| b.state() == State::Occupied)
    }
}
