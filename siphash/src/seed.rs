//! Entropy-seeded subkeys.
//!
//! The two SipHash subkeys should be unpredictable per process so that an
//! adversary who knows the hash construction still cannot force collisions
//! by choosing keys. We draw 16 bytes from the system entropy source
//! (`ring::rand::SystemRandom`); if that source is unavailable we fall back
//! to a time- and PID-derived seed and flag the result as weak so the caller
//! can log it rather than fail silently.

use ring::rand::{SecureRandom, SystemRandom};
use std::time::{SystemTime, UNIX_EPOCH};

/// The result of seeding the two subkeys.
pub struct SeededKeys {
    /// The first subkey.
    pub k0: u64,
    /// The second subkey.
    pub k1: u64,
    /// Set when system entropy was unavailable and the time/PID fallback
    /// was used instead. Callers should surface this as a warning.
    pub weak: bool,
}

/// Draw the two subkeys from system entropy, falling back to a weak,
/// time/PID-derived seed if the entropy source fails.
pub fn seed_from_entropy() -> SeededKeys {
    let mut buf = [0u8; 16];
    match SystemRandom::new().fill(&mut buf) {
        Ok(()) => SeededKeys {
            k0: u64::from_le_bytes(buf[..8].try_into().unwrap()),
            k1: u64::from_le_bytes(buf[8..].try_into().unwrap()),
            weak: false,
        },
        Err(_) => weak_fallback(),
    }
}

/// A time- and PID-based fallback used only when system entropy cannot be
/// read. This is not a secure seed, merely one unlikely to repeat across
/// process invocations on the same machine.
fn weak_fallback() -> SeededKeys {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0) as u64;
    let pid = std::process::id() as u64;

    SeededKeys {
        k0: nanos ^ pid.rotate_left(17),
        k1: nanos.rotate_right(23) ^ pid.wrapping_mul(0x9e37_79b9_7f4a_7c15),
        weak: true,
    }
}
