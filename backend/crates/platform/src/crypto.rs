//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Decode standard base64 (secrets in env vars)
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Encode bytes as unpadded base64url (token segments)
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_length_and_freshness() {
        let a = random_bytes(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, random_bytes(32));
    }

    #[test]
    fn test_base64url_rejects_standard_alphabet_padding() {
        assert_eq!(from_base64url(&to_base64url(b"\xfb\xff")).unwrap(), b"\xfb\xff");
        assert!(from_base64url("+/8=").is_err());
    }

    #[test]
    fn test_standard_base64_for_env_secrets() {
        assert_eq!(from_base64("c2VjcmV0").unwrap(), b"secret");
        assert!(from_base64("not base64!").is_err());
    }
}
