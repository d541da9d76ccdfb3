//! SipHash-2-4: a keyed pseudo-random function for hash table placement.
//!
//! This is the standard SipHash-2-4 construction (Aumasson & Bernstein): two
//! compression rounds per 8-byte block, four finalization rounds, reading the
//! input little-endian. Given the same two 64-bit subkeys, the same bytes
//! always hash to the same 64-bit digest; different subkeys randomize the
//! placement across process runs, which is what makes it suitable as the
//! hash in a table that must resist adversarially chosen keys.
//!
//! This crate only computes the digest. Seeding the subkeys from system
//! entropy (with a documented weak fallback) lives in [`seed`].

mod seed;

pub use seed::{seed_from_entropy, SeededKeys};

/// A single SipHash round (the "SipRound" of the reference construction).
///
/// This is a keyed ARX transformation, run twice per compression step and
/// four times during finalization.
macro_rules! round {
    ($v0:ident, $v1:ident, $v2:ident, $v3:ident) => {
        $v0 = $v0.wrapping_add($v1);
        $v1 = $v1.rotate_left(13);
        $v1 ^= $v0;
        $v0 = $v0.rotate_left(32);
        $v2 = $v2.wrapping_add($v3);
        $v3 = $v3.rotate_left(16);
        $v3 ^= $v2;
        $v0 = $v0.wrapping_add($v3);
        $v3 = $v3.rotate_left(21);
        $v3 ^= $v0;
        $v2 = $v2.wrapping_add($v1);
        $v1 = $v1.rotate_left(17);
        $v1 ^= $v2;
        $v2 = $v2.rotate_left(32);
    };
}

/// Hash `bytes` under the keyed permutation defined by `(k0, k1)`.
///
/// Two calls with the same `bytes`, `k0`, and `k1` always agree. The result
/// is suitable for reducing modulo an arbitrary positive bucket count; the
/// caller is expected to do that reduction (`digest % bucket_count`), since
/// this function has no notion of table size.
pub fn hash(k0: u64, k1: u64, bytes: &[u8]) -> u64 {
    let mut v0 = k0 ^ 0x736f_6d65_7073_6575;
    let mut v1 = k1 ^ 0x646f_7261_6e64_6f6d;
    let mut v2 = k0 ^ 0x6c79_6765_6e65_7261;
    let mut v3 = k1 ^ 0x7465_6462_7974_6573;

    let len = bytes.len();
    let chunks = bytes.chunks_exact(8);
    let tail = chunks.remainder();

    for chunk in chunks {
        let m = u64::from_le_bytes(chunk.try_into().unwrap());
        v3 ^= m;
        round!(v0, v1, v2, v3);
        round!(v0, v1, v2, v3);
        v0 ^= m;
    }

    // Final partial block: the low bytes hold the tail, the top byte holds
    // `len mod 256`.
    let mut last = [0u8; 8];
    last[..tail.len()].copy_from_slice(tail);
    last[7] = (len % 256) as u8;
    let m = u64::from_le_bytes(last);
    v3 ^= m;
    round!(v0, v1, v2, v3);
    round!(v0, v1, v2, v3);
    v0 ^= m;

    // Finalization: four more rounds after flipping a bit in v2.
    v2 ^= 0xff;
    round!(v0, v1, v2, v3);
    round!(v0, v1, v2, v3);
    round!(v0, v1, v2, v3);
    round!(v0, v1, v2, v3);

    v0 ^ v1 ^ v2 ^ v3
}
