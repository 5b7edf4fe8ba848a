use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Random bytes behind every generated key (192 bits)
const KEY_BYTES: usize = 24;

/// Generate a fresh hex-encoded API key
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest under which an access key is stored at rest
pub fn digest_access_key(access_key: &str) -> String {
    hex::encode(Sha256::digest(access_key.as_bytes()))
}

/// Length-independent constant-time comparison of two secrets.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    if provided.is_empty() || expected.is_empty() {
        return false;
    }
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.ct_eq(&b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_hex_and_unique() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_eq!(a.len(), KEY_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn access_key_digest_is_stable() {
        assert_eq!(digest_access_key("open-sesame"), digest_access_key("open-sesame"));
        assert_ne!(digest_access_key("open-sesame"), digest_access_key("open-sesame "));
        assert_eq!(digest_access_key("x").len(), 64);
    }

    #[test]
    fn secrets_match_rejects_empty_and_mismatched() {
        assert!(secrets_match("abc", "abc"));
        assert!(!secrets_match("abc", "abd"));
        assert!(!secrets_match("", ""));
        assert!(!secrets_match("abc", ""));
    }
}
