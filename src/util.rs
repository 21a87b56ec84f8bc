//! Small helpers shared across the storage engine and domain layer.

pub use crate::log::init_log;

/// Polynomial rolling hash turning usernames/train IDs/station names into
/// `u64` B+-tree keys. Kept as a plain rolling hash rather than reaching
/// for `DefaultHasher` so the resulting key is stable across Rust
/// versions and hasher-seed changes, which matters because the hash is
/// persisted on disk as a B+-tree key.
pub fn string_hash(s: &str) -> u64 {
    const MOD: u64 = 1_000_000_007;
    const BASE: u64 = 257;
    let mut hash: u64 = 0;
    for b in s.as_bytes() {
        hash = (hash * BASE + *b as u64) % MOD;
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(string_hash("G1234"), string_hash("G1234"));
        assert_ne!(string_hash("G1234"), string_hash("G1235"));
    }
}
