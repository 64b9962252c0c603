//! Deterministic, stable name derivation. `spec.md` §4.7, §9: "always append
//! the short content hash, then truncate the base if needed; never truncate
//! after appending."

use sha2::{Digest, Sha256};

const OBJECT_NAME_LIMIT: usize = 253;
const VOLUME_NAME_LIMIT: usize = 63;
const HASH_LEN: usize = 10;
const VOLUME_SUFFIX: &str = "-vol";

/// Stable short digest of `input`, hex-encoded and truncated to
/// [`HASH_LEN`] characters. Always the same length, so callers can reserve
/// space for it up front.
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)[..HASH_LEN].to_string()
}

/// `"<base>-<hash>"`, truncated to `limit` characters with the hash always
/// fully preserved (truncation only ever eats into `base`).
fn derive_name(base: &str, hash_input: &str, limit: usize, suffix: &str) -> String {
    let hash = short_hash(hash_input);
    let tail = format!("-{hash}{suffix}");
    if tail.len() >= limit {
        // Pathological: limit smaller than the hash itself. Return the tail
        // alone, truncated from the front, rather than panic.
        return tail.chars().rev().take(limit).collect::<String>().chars().rev().collect();
    }
    let max_base_len = limit - tail.len();
    let truncated_base: String = base.chars().take(max_base_len).collect();
    format!("{truncated_base}{tail}")
}

/// Object-store object name: `"<base>-<hash>"`, ≤253 chars, hash preserved.
pub fn object_name(base: &str, hash_input: &str) -> String {
    derive_name(base, hash_input, OBJECT_NAME_LIMIT, "")
}

/// Volume mount name: same rule but ≤63 chars and with a fixed suffix so
/// volume names are visibly distinct from object names at a glance.
pub fn volume_name(base: &str, hash_input: &str) -> String {
    derive_name(base, hash_input, VOLUME_NAME_LIMIT, VOLUME_SUFFIX)
}
