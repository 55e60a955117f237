//! Seeded, reproducible pseudo-randomness for the deterministic analysis path.
//!
//! Every number comes from hashing `(seed, salt)`; nothing here touches a
//! process-global random source, so identical inputs always give identical outputs.

use crate::brief::DecisionBrief;

/// Stable seed for one framework evaluated against one decision.
pub fn framework_seed(framework_id: &str, brief: &DecisionBrief) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(framework_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(brief.title.trim().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(brief.statement.trim().as_bytes());
    first_u64(hasher.finalize().as_bytes())
}

fn first_u64(bytes: &[u8; 32]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

/// Hash `(seed, salt)` to a float in `[0, 1)`.
pub fn unit(seed: u64, salt: &str) -> f64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(salt.as_bytes());
    let value = first_u64(hasher.finalize().as_bytes());
    // top 53 bits fill an f64 mantissa exactly
    (value >> 11) as f64 / (1u64 << 53) as f64
}

/// Hash `(seed, salt)` to a float in `[lo, hi)`.
pub fn range(seed: u64, salt: &str, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * unit(seed, salt)
}

/// Hash `(seed, salt)` to an index in `[0, len)`; `len == 0` yields 0.
pub fn pick(seed: u64, salt: &str, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((unit(seed, salt) * len as f64) as usize).min(len - 1)
}
