//! A concurrent, incrementally-resizing open-addressing hash table.
//!
//! This is the one subsystem of the storage-engine learning workspace with
//! real engineering content: a bucket array protected by per-bucket locks,
//! SipHash-2-4 placement, linear probing with tombstone reclamation, and an
//! incremental (stop-the-world-free) resize that migrates entries in small
//! batches piggy-backed on ordinary `get`/`put`/`delete` calls.
//!
//! The design follows `chashmap`'s bucket-level-lock approach generalized
//! with an explicit old/primary split so a resize never has to block every
//! other thread while it copies.

#[macro_use]
extern crate quick_error;

mod bucket;
mod consts;
mod engine;
mod error;
mod keys;
mod resize;
mod table;

pub use engine::{HashEngine, Stats};
pub use error::Error;

#[cfg(test)]
mod tests;
