use std::fmt::Write;

use sha2::{Digest, Sha256};

/// First 12 hex digits of the SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest.iter().take(6).fold(String::with_capacity(12), |mut hex, byte| {
        let _ = write!(&mut hex, "{byte:02x}");
        hex
    })
}

#[cfg(test)]
mod tests {
    use super::content_hash;

    #[test]
    fn hash_is_short_stable_hex() {
        let first = content_hash("# Title\n");
        assert_eq!(first.len(), 12);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(first, content_hash("# Title\n"));
        assert_ne!(first, content_hash("# Title\n\n"));
    }

    #[test]
    fn empty_input_matches_known_digest() {
        assert_eq!(content_hash(""), "e3b0c44298fc");
    }
}
