//! Numeric profile id.
//!
//! Other subsystems (history database, avatar cache) key their data by a
//! 32-bit id derived from the profile name rather than by the name itself.
//! The id is a pure function of the name: MD5 of the UTF-8 bytes, with the
//! four little-endian 32-bit words of the digest XOR-folded together.  Ids
//! written by earlier installations are derived the same way, so the hash
//! must not change.

use md5::{Digest, Md5};

/// Derives the 32-bit id of the profile called `name`.
pub fn profile_id(name: &str) -> u32 {
    let digest = Md5::digest(name.as_bytes());
    digest
        .chunks_exact(4)
        .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
        .fold(0, |acc, word| acc ^ word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_id_is_deterministic() {
        assert_eq!(profile_id("alice"), profile_id("alice"));
    }

    #[test]
    fn test_profile_id_differs_for_different_names() {
        assert_ne!(profile_id("alice"), profile_id("bob"));
        assert_ne!(profile_id("alice"), profile_id("Alice"));
    }

    #[test]
    fn test_profile_id_matches_existing_installations() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(profile_id(""), 0x3b75_655e);
        assert_eq!(profile_id("alice"), 0x778e_a552);
    }
}
