use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))?;
    Ok(decoded)
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Generate a URL-safe random string from `len` bytes of system entropy.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64url_roundtrip() {
        let input = b"some bytes with + and / troublemakers \xff\x00";
        let encoded = base64url_encode(input);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));

        let decoded = base64url_decode(&encoded).expect("decoding our own output should succeed");
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_base64url_decode_rejects_invalid_input() {
        let result = base64url_decode("not%valid%base64url");
        assert!(matches!(result, Err(UtilError::Format(_))));
    }

    #[test]
    fn test_gen_random_string_length_and_uniqueness() {
        let a = gen_random_string(32).expect("random generation should succeed");
        let b = gen_random_string(32).expect("random generation should succeed");

        // 32 bytes encode to 43 base64url characters without padding
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
    }
}
