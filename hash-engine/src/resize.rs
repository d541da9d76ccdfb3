//! Incremental resize coordinator (§4.4): trigger evaluation, cooperative
//! migration, and teardown of the old array once it is safe.

use crate::consts;
use crate::engine::HashEngine;
use crate::error::Error;
use crate::keys;
use crate::table::Table;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const ORDERING: Ordering = Ordering::SeqCst;

impl HashEngine {
    /// Migrate up to `batch` old-array slots, piggy-backed on every public
    /// call (§4.4 Cooperative migration).
    pub(crate) fn migrate_some(&self, batch: usize) {
        self.migrate_workers.fetch_add(1, ORDERING);

        let (primary, old) = {
            let arrays = self.arrays.read();
            (arrays.primary.clone(), arrays.old.clone())
        };

        let Some(old) = old else {
            self.migrate_workers.fetch_sub(1, ORDERING);
            return;
        };

        let old_count = old.len();
        let (k0, k1) = keys::global_keys(&self.log);

        for _ in 0..batch {
            let idx = self.migrate_cursor.fetch_add(1, ORDERING);
            if idx >= old_count {
                self.migrate_workers.fetch_sub(1, ORDERING);
                self.try_finalize();
                return;
            }
            self.migrate_one(&old, &primary, idx, k0, k1);
        }

        self.migrate_workers.fetch_sub(1, ORDERING);
        self.try_finalize();
    }

    /// Migrate a single old-array slot into the primary array.
    ///
    /// The key/value are cloned out of the old bucket and inserted into the
    /// primary *before* the old bucket is tombstoned, so the key is never
    /// briefly absent from both arrays (during the overlap it is OCCUPIED in
    /// both, but lookup always checks the primary first, so no duplicate is
    /// ever observed, per §4.4 Read visibility during resize). This also
    /// means the old bucket's lock and the primary's destination bucket
    /// lock are never held at the same time.
    fn migrate_one(&self, old: &Table, primary: &Table, idx: usize, k0: u64, k1: u64) {
        let bucket = old.bucket_at(idx);
        let Some((key, value)) = bucket.clone_if_occupied() else {
            return;
        };

        match primary.insert(&key, &value, k0, k1) {
            Ok(_) => {
                bucket.tombstone_unconditionally();
            }
            Err(_) => {
                // The new array was sized to hold the whole live set, so
                // this should not happen. The slot stays Occupied in the old
                // array; `migrate_cursor` has already advanced past `idx`,
                // so no later call claims it again on its own. `try_finalize`
                // scans for leftover Occupied buckets once the cursor
                // reaches the end and rewinds it so a future migrate_some
                // pass retries this slot (a direct put/delete on this exact
                // key can also resolve it sooner, by deleting it from the
                // old array directly).
                slog::warn!(self.log, "migration could not place key in primary array; will retry");
            }
        }
    }

    /// Finalize the old array's teardown if migration has drained it and no
    /// thread is still inside `migrate_some` (§4.4 Finalization).
    ///
    /// Idempotent: called speculatively after every batch, it only acts
    /// once the cursor has passed the end and the worker count is zero. If
    /// an earlier `migrate_one` failed to place its key and left a bucket
    /// Occupied, finalization is refused and the cursor is rewound so the
    /// next pass retries the whole array rather than silently dropping live
    /// data along with the old array.
    pub(crate) fn try_finalize(&self) {
        let _structural = self.engine_lock.lock();
        let mut arrays = self.arrays.write();

        let Some(old) = &arrays.old else { return };
        if self.migrate_workers.load(ORDERING) != 0 || self.migrate_cursor.load(ORDERING) < old.len() {
            return;
        }

        if old.any_occupied() {
            slog::warn!(self.log, "resize pass left occupied buckets behind; retrying");
            self.migrate_cursor.store(0, ORDERING);
            return;
        }

        slog::debug!(self.log, "resize finalized"; "buckets" => arrays.primary.len());
        arrays.old = None;
        self.migrate_cursor.store(0, ORDERING);
    }

    /// Evaluate the grow/shrink trigger and start a resize if warranted
    /// (§4.4 Trigger). Called after every put/delete's main work.
    pub(crate) fn maybe_start_resize(&self) {
        if self.arrays.read().old.is_some() {
            // A resize is already in progress.
            return;
        }

        let count = self.arrays.read().primary.len();
        let items = self.item_count_hint();

        if items * consts::MAX_LOAD_DENOM >= count * consts::MAX_LOAD_NUM {
            let new_count = (count.saturating_mul(2)).min(consts::MAX_BUCKETS);
            if new_count > count {
                if let Err(err) = self.start_resize(new_count) {
                    slog::warn!(self.log, "failed to start grow resize"; "error" => format!("{}", err));
                }
            }
            return;
        }

        if count > consts::MIN_BUCKETS && items * consts::MIN_LOAD_DENOM < count * consts::MIN_LOAD_NUM {
            let new_count = (count / 2).max(consts::MIN_BUCKETS);
            if new_count < count {
                if let Err(err) = self.start_resize(new_count) {
                    slog::warn!(self.log, "failed to start shrink resize"; "error" => format!("{}", err));
                }
            }
        }
    }

    fn item_count_hint(&self) -> usize {
        // Reaches through to the public counter; kept as a tiny indirection
        // so the trigger reads like a named quantity rather than a raw
        // atomic load sprinkled through this module.
        self.stats().item_count as usize
    }

    /// Start an incremental resize (§4.4 Start).
    fn start_resize(&self, new_count: usize) -> Result<(), Error> {
        let _structural = self.engine_lock.lock();
        let mut arrays = self.arrays.write();

        // Re-check under the lock: another thread may have started (or
        // already finished) a resize while we were evaluating the trigger.
        if arrays.old.is_some() {
            return Ok(());
        }

        let new_table = Arc::new(Table::new(new_count)?);
        let old_count = arrays.primary.len();
        let old_primary = std::mem::replace(&mut arrays.primary, new_table);
        arrays.old = Some(old_primary);
        self.migrate_cursor.store(0, ORDERING);

        slog::debug!(self.log, "resize started"; "old_buckets" => old_count, "new_buckets" => new_count);
        Ok(())
    }
}
