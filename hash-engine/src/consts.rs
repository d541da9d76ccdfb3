//! Tunable constants (§6). These are implementation-provided, not per-call
//! options: there is deliberately no way to override them per `HashEngine`.

/// Floor for `primary_count`.
pub(crate) const MIN_BUCKETS: usize = 8;
/// Ceiling for `primary_count`.
pub(crate) const MAX_BUCKETS: usize = 1 << 30;
/// Grow-threshold numerator/denominator (~0.75).
pub(crate) const MAX_LOAD_NUM: usize = 3;
pub(crate) const MAX_LOAD_DENOM: usize = 4;
/// Shrink-threshold numerator/denominator (~0.10).
pub(crate) const MIN_LOAD_NUM: usize = 1;
pub(crate) const MIN_LOAD_DENOM: usize = 10;
/// Slots migrated per public call.
pub(crate) const MIGRATE_BATCH: usize = 16;
