//! Process-wide SipHash subkeys (§3 HashEngine, §4.1, §9).
//!
//! The subkeys are seeded once per process, lazily, from system entropy, and
//! shared by every `HashEngine` in the process: this is what makes two
//! engines in the same process agree on bucket placement (§8 scenario 6)
//! while two separate process runs do not.

use siphash::seed_from_entropy;
use slog::Logger;
use std::sync::OnceLock;

static KEYS: OnceLock<(u64, u64)> = OnceLock::new();

/// Fetch the process-wide subkeys, seeding them on first call.
///
/// `log` is only consulted by whichever thread wins the race to perform the
/// one-shot initialization; a `WeakKey` warning is emitted through it if
/// system entropy was unavailable and the time/PID fallback had to be used.
pub(crate) fn global_keys(log: &Logger) -> (u64, u64) {
    *KEYS.get_or_init(|| {
        let seeded = seed_from_entropy();
        if seeded.weak {
            slog::warn!(
                log,
                "WeakKey: system entropy unavailable, seeded SipHash subkeys from time/PID fallback"
            );
        }
        (seeded.k0, seeded.k1)
    })
}
