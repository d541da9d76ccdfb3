//! Bucket primitives (§3 Bucket entity, §4.2).
//!
//! A bucket's `state` is a tagged discriminant published atomically, so a
//! prescan can rule out empty/tombstone buckets without ever touching the
//! lock (used by lookup and delete). Once the prescan says `Occupied`, the
//! caller must re-check under the lock before trusting the key or value:
//! the atomic store that publishes a state transition is always the *last*
//! write of that transition, acting as its release.
//!
//! Insert does not use the prescan at all (see `Bucket::lock`, `Table::insert`
//! in `table.rs`): selecting a slot and writing to it must happen under one
//! continuous lock acquisition, or two concurrent inserts can both pick the
//! same free slot and one silently clobbers the other.

use crate::error::Error;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU8, Ordering};

/// The three states a bucket can be in (§3).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum State {
    Empty = 0,
    Occupied = 1,
    Tombstone = 2,
}

impl State {
    fn from_tag(tag: u8) -> State {
        match tag {
            0 => State::Empty,
            1 => State::Occupied,
            _ => State::Tombstone,
        }
    }
}

/// The lock-protected payload of a bucket. This is the source of truth;
/// `Bucket::state` mirrors its discriminant for lock-free reads.
enum Slot {
    Empty,
    Occupied { key: Box<[u8]>, value: Box<[u8]> },
    Tombstone,
}

/// One slot of the hash table's array.
pub(crate) struct Bucket {
    state: AtomicU8,
    slot: Mutex<Slot>,
}

/// Copy `bytes` into a freshly allocated, exactly-sized buffer.
///
/// Allocation can fail (`OutOfMemory`) without ever touching a bucket: the
/// caller only writes into a bucket once it holds a buffer in hand.
pub(crate) fn try_alloc(bytes: &[u8]) -> Result<Box<[u8]>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len())
        .map_err(|_| Error::OutOfMemory)?;
    buf.extend_from_slice(bytes);
    Ok(buf.into_boxed_slice())
}

impl Bucket {
    pub(crate) fn empty() -> Bucket {
        Bucket {
            state: AtomicU8::new(State::Empty as u8),
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Lock-free read of the published state. Used for the probe's prescan
    /// in `lookup` and `delete` (not `insert`, see the module doc comment).
    pub(crate) fn state(&self) -> State {
        State::from_tag(self.state.load(Ordering::Acquire))
    }

    /// Re-verify under lock that this bucket is Occupied with a matching
    /// key, and if so return a clone of its value. Returns `None` if the
    /// key doesn't match or the state changed since the prescan (the caller
    /// must treat that exactly like a non-match and keep probing).
    pub(crate) fn read_value_if_key_matches(&self, key: &[u8]) -> Option<Vec<u8>> {
        let slot = self.slot.lock();
        match &*slot {
            Slot::Occupied { key: k, value } if k.as_ref() == key => Some(value.to_vec()),
            _ => None,
        }
    }

    /// Clone out `(key, value)` if this bucket is Occupied. Used by the
    /// migrator, which must not hold this bucket's lock while inserting
    /// into the destination array.
    pub(crate) fn clone_if_occupied(&self) -> Option<(Box<[u8]>, Box<[u8]>)> {
        let slot = self.slot.lock();
        match &*slot {
            Slot::Occupied { key, value } => Some((key.clone(), value.clone())),
            _ => None,
        }
    }

    /// Lock this bucket and hand back a `Locked` view of it. The lock stays
    /// held for as long as the `Locked` value lives, so a caller can inspect
    /// the slot and then act on that same inspection (occupy it, replace its
    /// value) without another thread being able to interleave a change.
    pub(crate) fn lock(&self) -> Locked<'_> {
        Locked {
            state: &self.state,
            slot: self.slot.lock(),
        }
    }

    /// Transition an Occupied bucket matching `key` to Tombstone, freeing
    /// its key/value. Returns the freed `(key_len, value_len)`, or `None` if
    /// the key didn't match (the caller keeps probing).
    pub(crate) fn tombstone_if_matches(&self, key: &[u8]) -> Option<(usize, usize)> {
        let mut slot = self.slot.lock();
        let matches = matches!(&*slot, Slot::Occupied { key: k, .. } if k.as_ref() == key);
        if !matches {
            return None;
        }
        let prev = std::mem::replace(&mut *slot, Slot::Tombstone);
        self.state.store(State::Tombstone as u8, Ordering::Release);
        match prev {
            Slot::Occupied { key, value } => Some((key.len(), value.len())),
            _ => unreachable!("checked Occupied above"),
        }
    }

    /// Unconditionally transition this bucket to Tombstone, freeing
    /// whatever it held. Used by the migrator once the key/value has been
    /// cloned into the primary array.
    pub(crate) fn tombstone_unconditionally(&self) -> Option<(usize, usize)> {
        let mut slot = self.slot.lock();
        let prev = std::mem::replace(&mut *slot, Slot::Tombstone);
        self.state.store(State::Tombstone as u8, Ordering::Release);
        match prev {
            Slot::Occupied { key, value } => Some((key.len(), value.len())),
            _ => None,
        }
    }
}

/// A bucket's mutex held open, returned by `Bucket::lock`.
///
/// `Table::insert` probes by acquiring one of these per candidate bucket and
/// deciding, under that same lock, whether to match/replace or to claim the
/// slot as the insertion target (mirroring `chashmap::Table::lookup_or_free`,
/// which scans while holding each bucket's write lock and returns the held
/// guard for the chosen free bucket instead of re-deriving it afterward).
pub(crate) struct Locked<'a> {
    state: &'a AtomicU8,
    slot: MutexGuard<'a, Slot>,
}

impl<'a> Locked<'a> {
    /// Is this bucket Occupied with a matching key?
    pub(crate) fn key_matches(&self, key: &[u8]) -> bool {
        matches!(&*self.slot, Slot::Occupied { key: k, .. } if k.as_ref() == key)
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(&*self.slot, Slot::Empty)
    }

    pub(crate) fn is_tombstone(&self) -> bool {
        matches!(&*self.slot, Slot::Tombstone)
    }

    /// Publish `(key, value)` into this bucket. Only valid to call while
    /// `is_empty()`/`is_tombstone()` was observed true under this same,
    /// continuously-held lock; consumes the guard since the slot is settled
    /// once this returns.
    pub(crate) fn occupy(mut self, key: Box<[u8]>, value: Box<[u8]>) {
        *self.slot = Slot::Occupied { key, value };
        self.state.store(State::Occupied as u8, Ordering::Release);
    }

    /// Replace the value of this (already key-matched) Occupied bucket,
    /// keeping the key buffer untouched. Returns the freed old value
    /// length. Only valid to call after `key_matches` observed true under
    /// this same lock.
    pub(crate) fn replace_value(mut self, value: Box<[u8]>) -> usize {
        match &mut *self.slot {
            Slot::Occupied { value: v, .. } => {
                let old_len = v.len();
                *v = value;
                old_len
            }
            _ => unreachable!("caller verified key_matches while holding this lock"),
        }
    }
}
