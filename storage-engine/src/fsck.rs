//! Consistency-check sketch (out of scope; see the crate root).
//!
//! A real fsck pass would walk persisted state looking for corruption such
//! as checksum mismatches and dangling references. The hash engine has no
//! on-disk representation to check, so this module documents what a check
//! would inspect without performing any of it.

/// What a consistency check would report, if one existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    /// A stored checksum did not match the recomputed one.
    ChecksumMismatch,
    /// A structure referenced a location that doesn't exist.
    DanglingReference,
}

/// A sketch of a consistency-check pass. Always reports a clean pass,
/// because there is nothing on disk yet for it to examine.
#[allow(dead_code)]
pub fn check() -> Vec<Finding> {
    Vec::new()
}
