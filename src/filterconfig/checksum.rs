//! Fixed-width content digest for the runtime-configuration document.
//! `spec.md` §3 invariant 5, §6 ("Checksum is a fixed-width content
//! digest").

use sha2::{Digest, Sha256};

pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_and_fixed_width() {
        let a = digest(b"hello");
        let b = digest(b"hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn digest_changes_with_content() {
        assert_ne!(digest(b"hello"), digest(b"world"));
    }
}
