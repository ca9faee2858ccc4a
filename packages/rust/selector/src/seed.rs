//! Day-granular seed derivation.
//!
//! Re-running the pipeline on the same calendar day must reproduce the
//! same draw, so the RNG seed comes from the run date alone, never from
//! wall-clock entropy.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Derive a deterministic RNG seed from a calendar date.
///
/// First 8 bytes (big-endian) of the SHA-256 digest of the ISO
/// `YYYY-MM-DD` string.
pub fn day_seed(date: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
