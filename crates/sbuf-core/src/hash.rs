//! # Element Name Hashing
//!
//! Each element keeps a precomputed 64-bit hash of its name so that tree
//! lookups touch only same-hash candidates. The hash is the first eight bytes
//! (little-endian) of the SHA-256 digest of the UTF-8 name, which is stable
//! across processes, platforms, and releases.
//!
//! The hash only narrows the search. Lookups always confirm with an exact
//! name comparison, so two distinct names that collide remain distinct
//! elements.

use sha2::{Digest, Sha256};

/// Compute the 64-bit lookup hash of an element name.
pub fn name_hash(name: &str) -> u64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(name_hash("Name"), name_hash("Name"));
    }

    #[test]
    fn case_sensitive() {
        assert_ne!(name_hash("name"), name_hash("Name"));
    }

    #[test]
    fn known_vector() {
        // SHA-256("") = e3b0c44298fc1c14...; first eight bytes read little-endian.
        assert_eq!(name_hash(""), 0x141c_fc98_42c4_b0e3);
    }
}
