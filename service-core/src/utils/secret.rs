use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare a presented shared secret against the expected one.
///
/// Both sides are hashed first so the comparison runs over equal-length
/// digests, and the digests are compared in constant time. An empty expected
/// secret never matches.
pub fn secrets_match(expected: &str, presented: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let expected_digest = Sha256::digest(expected.as_bytes());
    let presented_digest = Sha256::digest(presented.as_bytes());

    expected_digest.ct_eq(&presented_digest).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_secrets_match() {
        assert!(secrets_match("my_secret_key", "my_secret_key"));
    }

    #[test]
    fn different_secrets_do_not_match() {
        assert!(!secrets_match("my_secret_key", "my_secret_kez"));
        assert!(!secrets_match("my_secret_key", "my_secret"));
        assert!(!secrets_match("my_secret_key", ""));
    }

    #[test]
    fn empty_expected_secret_never_matches() {
        assert!(!secrets_match("", ""));
        assert!(!secrets_match("", "anything"));
    }
}
