//! Signed session token codec
//!
//! Tokens are JWT-shaped (`header.payload.signature`, base64url segments,
//! HMAC-SHA256) but only HS256 is ever produced or accepted. No expiry is
//! embedded in the token itself: expiry lives in the session row, so
//! revocation works by deleting the row rather than waiting out a TTL.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::session::types::TokenData;
use crate::utils::{base64url_decode, base64url_encode};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Internal verification failures. All of these collapse to a single
/// invalid-token rejection at the authentication boundary; the split exists
/// so tests and logs can tell a bad signature from a bad payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Payload decode failed")]
    Decode,

    #[error("Crypto error: {0}")]
    Crypto(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    data: TokenData,
}

fn mac_for(secret: &[u8]) -> Result<HmacSha256, TokenError> {
    HmacSha256::new_from_slice(secret)
        .map_err(|_| TokenError::Crypto("Failed to initialize HMAC".to_string()))
}

/// Sign `data` into a token string. Deterministic for identical input and
/// key.
pub fn sign_token(secret: &[u8], data: &TokenData) -> Result<String, TokenError> {
    let header = TokenHeader {
        alg: TOKEN_ALGORITHM.to_string(),
        typ: TOKEN_TYPE.to_string(),
    };
    let claims = TokenClaims { data: data.clone() };

    let header_json =
        serde_json::to_vec(&header).map_err(|e| TokenError::Crypto(e.to_string()))?;
    let claims_json =
        serde_json::to_vec(&claims).map_err(|e| TokenError::Crypto(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        base64url_encode(&header_json),
        base64url_encode(&claims_json)
    );

    let mut mac = mac_for(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!("{signing_input}.{}", base64url_encode(&signature)))
}

/// Verify a token string and return its claims.
///
/// The signature is checked (constant-time) before the payload is decoded,
/// so a bad payload with a valid signature is a decode failure, not a
/// signature failure.
pub fn verify_token(secret: &[u8], token: &str) -> Result<TokenData, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed);
    }

    let header_bytes = base64url_decode(parts[0]).map_err(|_| TokenError::Malformed)?;
    let header: TokenHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;

    if header.alg != TOKEN_ALGORITHM {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    let supplied_signature = base64url_decode(parts[2]).map_err(|_| TokenError::Malformed)?;

    let signing_input = format!("{}.{}", parts[0], parts[1]);
    let mut mac = mac_for(secret)?;
    mac.update(signing_input.as_bytes());
    let expected_signature = mac.finalize().into_bytes();

    if expected_signature
        .as_slice()
        .ct_eq(supplied_signature.as_slice())
        .unwrap_u8()
        != 1
    {
        return Err(TokenError::InvalidSignature);
    }

    let payload_bytes = base64url_decode(parts[1]).map_err(|_| TokenError::Decode)?;
    let claims: TokenClaims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Decode)?;

    Ok(claims.data)
}
