//! Prompt fingerprinting for log correlation.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Number of hex characters kept by [`hash_prompt`].
const FINGERPRINT_LEN: usize = 12;

/// Short, stable SHA-256 fingerprint of a prompt.
///
/// Council runs log the fingerprint of their shared base context so that
/// role calls of the same run can be correlated without logging the prompt.
pub fn hash_prompt(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    let mut hex = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN / 2) {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::hash_prompt;

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let first = hash_prompt("USER REQUEST:\nhello");
        let second = hash_prompt("USER REQUEST:\nhello");

        assert_eq!(first, second);
        assert_eq!(first.len(), 12);
        assert_ne!(first, hash_prompt("USER REQUEST:\nbye"));
    }

    #[test]
    fn test_known_digest_prefix() {
        // sha256("") = e3b0c442 98fc1c14 ...
        assert_eq!(hash_prompt(""), "e3b0c44298fc");
    }
}
