//! `HashEngine` public surface (§4.5) and the structural state it guards.

use crate::consts;
use crate::error::Error;
use crate::keys;
use crate::table::{InsertOutcome, Table};
use parking_lot::{Mutex, RwLock};
use slog::Logger;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// The atomic ordering used for the engine's own counters (item count, total
/// memory, migration cursor/worker count). Matches `chashmap`'s choice of a
/// single conservative ordering for all of its bookkeeping atomics.
const ORDERING: Ordering = Ordering::SeqCst;

/// The primary and (if a resize is in progress) old bucket arrays.
///
/// Held behind a `RwLock` so that readers can cheaply clone the `Arc`
/// handles and then operate lock-free against their own snapshot, while
/// structural changes (starting a resize, finalizing one) take the write
/// side under `engine_lock`. This plays the role of the "pointer/handle"
/// fields `primary_buckets`/`old_buckets` in §3.
pub(crate) struct Arrays {
    pub(crate) primary: Arc<Table>,
    pub(crate) old: Option<Arc<Table>>,
}

/// A non-blocking snapshot of the engine's counters (§4.5 `stats`).
///
/// The three fields are independent atomic reads; they may be slightly
/// inconsistent with one another if a mutation lands between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub item_count: u32,
    pub bucket_count: u32,
    pub total_memory: u32,
}

/// A concurrent, incrementally-resizing open-addressing hash table mapping
/// opaque byte-string keys to opaque byte-string values.
///
/// See the crate root for the full data model and concurrency contract.
pub struct HashEngine {
    pub(crate) arrays: RwLock<Arrays>,
    pub(crate) engine_lock: Mutex<()>,
    pub(crate) migrate_cursor: AtomicUsize,
    pub(crate) migrate_workers: AtomicUsize,
    item_count: AtomicU32,
    total_memory: AtomicU32,
    pub(crate) log: Logger,
}

impl HashEngine {
    /// Allocate a fresh engine with at least `initial_count` buckets (it is
    /// clamped into `[MIN_BUCKETS, MAX_BUCKETS]` to keep invariant 5, that
    /// `primary_count` always lies in that range, true from the start).
    ///
    /// Fails with `InvalidArgument` if `initial_count == 0`, or
    /// `OutOfMemory` if the bucket array cannot be allocated.
    pub fn init(initial_count: usize, log: Logger) -> Result<HashEngine, Error> {
        if initial_count == 0 {
            return Err(Error::InvalidArgument("initial bucket count must be nonzero"));
        }
        let count = initial_count.clamp(consts::MIN_BUCKETS, consts::MAX_BUCKETS);
        let primary = Table::new(count)?;

        Ok(HashEngine {
            arrays: RwLock::new(Arrays {
                primary: Arc::new(primary),
                old: None,
            }),
            engine_lock: Mutex::new(()),
            migrate_cursor: AtomicUsize::new(0),
            migrate_workers: AtomicUsize::new(0),
            item_count: AtomicU32::new(0),
            total_memory: AtomicU32::new(0),
            log,
        })
    }

    fn snapshot(&self) -> (Arc<Table>, Option<Arc<Table>>) {
        let arrays = self.arrays.read();
        (arrays.primary.clone(), arrays.old.clone())
    }

    /// Look up `key`, consulting the primary array and then, if a resize is
    /// in progress, the old array (§4.4 Read visibility during resize).
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>, Error> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("key must be non-empty"));
        }

        self.migrate_some(consts::MIGRATE_BATCH);

        let (primary, old) = self.snapshot();
        let (k0, k1) = keys::global_keys(&self.log);

        if let Some(value) = primary.lookup(key, k0, k1) {
            return Ok(value);
        }
        if let Some(old) = old {
            if let Some(value) = old.lookup(key, k0, k1) {
                return Ok(value);
            }
        }

        Err(Error::NotFound)
    }

    /// Insert or replace `key => value` (§4.3/§4.4 Write during resize).
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("key must be non-empty"));
        }
        if value.is_empty() {
            return Err(Error::InvalidArgument("value must be non-empty"));
        }

        self.migrate_some(consts::MIGRATE_BATCH);

        let (primary, old) = self.snapshot();
        let (k0, k1) = keys::global_keys(&self.log);

        // To avoid double-accounting a key that exists in both arrays
        // mid-migration, retire any copy in the old array first.
        let old_freed = old.as_ref().and_then(|old| old.delete(key, k0, k1));

        let outcome = primary.insert(key, value, k0, k1)?;

        // `old_freed` and `outcome` can each independently reflect the same
        // logical entry (a migrator can duplicate a key into the primary
        // before tombstoning its old copy), so the two must be combined by
        // outcome rather than always summed; see the migrate-then-tombstone
        // ordering note in DESIGN.md.
        let (added, removed) = match (outcome, old_freed) {
            (InsertOutcome::Inserted, Some((old_klen, old_vlen))) => {
                // Replacement spanning arrays (§4.4): the key's only prior
                // copy lived in the old array; it now lives in the primary
                // with new bytes. item_count is unchanged.
                (key.len() + value.len(), old_klen + old_vlen)
            }
            (InsertOutcome::Inserted, None) => {
                // Genuinely new key.
                self.item_count.fetch_add(1, ORDERING);
                (key.len() + value.len(), 0)
            }
            (InsertOutcome::Replaced { old_value_len }, Some(_)) => {
                // Raced with a migrator that had already duplicated this
                // key into the primary: the old array's copy we just
                // retired was never separately accounted (it's the same
                // logical entry), so only the value length changes.
                (value.len(), old_value_len)
            }
            (InsertOutcome::Replaced { old_value_len }, None) => {
                // Ordinary same-array value replace.
                (value.len(), old_value_len)
            }
        };
        self.adjust_memory(added, removed);

        self.maybe_start_resize();
        Ok(())
    }

    /// Delete `key` (§4.3/§4.4 Delete during resize): try the primary
    /// first, then the old array.
    pub fn delete(&self, key: &[u8]) -> Result<(), Error> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("key must be non-empty"));
        }

        self.migrate_some(consts::MIGRATE_BATCH);

        let (primary, old) = self.snapshot();
        let (k0, k1) = keys::global_keys(&self.log);

        let freed = match primary.delete(key, k0, k1) {
            Some(freed) => Some(freed),
            None => old.as_ref().and_then(|old| old.delete(key, k0, k1)),
        };

        match freed {
            Some((klen, vlen)) => {
                self.item_count.fetch_sub(1, ORDERING);
                self.total_memory.fetch_sub((klen + vlen) as u32, ORDERING);
                self.maybe_start_resize();
                Ok(())
            }
            None => Err(Error::NotFound),
        }
    }

    /// A non-blocking snapshot of the engine's counters.
    pub fn stats(&self) -> Stats {
        Stats {
            item_count: self.item_count.load(ORDERING),
            bucket_count: self.arrays.read().primary.len() as u32,
            total_memory: self.total_memory.load(ORDERING),
        }
    }

    /// Free every bucket's key/value buffers and both arrays.
    ///
    /// This is a no-op beyond what dropping `self` already does; it exists
    /// so the lifecycle in §4.5 has an explicit terminal call, matching the
    /// usual C-style `init`/`destroy` pairing even though Rust's own drop
    /// glue makes the free unconditional.
    pub fn destroy(self) {}

    fn adjust_memory(&self, added: usize, removed: usize) {
        if added >= removed {
            self.total_memory.fetch_add((added - removed) as u32, ORDERING);
        } else {
            self.total_memory.fetch_sub((removed - added) as u32, ORDERING);
        }
    }
}
