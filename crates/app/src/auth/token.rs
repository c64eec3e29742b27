//! API token generation, parsing and hashing.

use std::fmt::{self, Write};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

/// Prefix of every bearer token.
pub const API_TOKEN_PREFIX: &str = "em_";

/// Number of random bytes in a token secret.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

const API_TOKEN_SECRET_HEX_CHARS: usize = API_TOKEN_SECRET_BYTES * 2;

/// The random part of a bearer token. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiTokenSecret {
    bytes: [u8; API_TOKEN_SECRET_BYTES],
}

impl ApiTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; API_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn generate_api_token_secret() -> ApiTokenSecret {
    let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut bytes);

    ApiTokenSecret::from_bytes(bytes)
}

/// Render a secret as `em_<64 lowercase hex chars>`.
#[must_use]
pub fn format_api_token(secret: &ApiTokenSecret) -> String {
    format!("{API_TOKEN_PREFIX}{}", to_hex(secret.as_bytes()))
}

/// # Errors
///
/// Returns an error when the prefix is missing or the secret is not
/// exactly 64 hex characters.
pub fn parse_api_token(token: &str) -> Result<ApiTokenSecret, ApiTokenError> {
    let secret_hex = token
        .strip_prefix(API_TOKEN_PREFIX)
        .ok_or(ApiTokenError::InvalidFormat)?;

    if secret_hex.len() != API_TOKEN_SECRET_HEX_CHARS {
        return Err(ApiTokenError::InvalidSecretEncoding);
    }

    let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

    for (byte, pair) in bytes.iter_mut().zip(secret_hex.as_bytes().chunks_exact(2)) {
        let pair = std::str::from_utf8(pair).map_err(|_| ApiTokenError::InvalidSecretEncoding)?;

        *byte = u8::from_str_radix(pair, 16).map_err(|_| ApiTokenError::InvalidSecretEncoding)?;
    }

    Ok(ApiTokenSecret::from_bytes(bytes))
}

/// SHA-256 digest of the secret, hex encoded. Only this digest is stored.
#[must_use]
pub fn hash_api_token(secret: &ApiTokenSecret) -> String {
    to_hex(&Sha256::digest(secret.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn formatted_token_parses_back_to_its_secret() -> TestResult {
        let secret = ApiTokenSecret::from_bytes([0xAB; API_TOKEN_SECRET_BYTES]);
        let token = format_api_token(&secret);

        assert!(token.starts_with("em_"));
        assert_eq!(token.len(), 3 + 64);
        assert_eq!(parse_api_token(&token)?, secret);

        Ok(())
    }

    #[test]
    fn wrong_prefix_is_rejected() {
        let token = format!("lt_{}", "ab".repeat(API_TOKEN_SECRET_BYTES));

        assert_eq!(parse_api_token(&token), Err(ApiTokenError::InvalidFormat));
    }

    #[test]
    fn malformed_secret_is_rejected() {
        assert_eq!(
            parse_api_token("em_abcd"),
            Err(ApiTokenError::InvalidSecretEncoding)
        );
        assert_eq!(
            parse_api_token(&format!("em_{}", "zz".repeat(API_TOKEN_SECRET_BYTES))),
            Err(ApiTokenError::InvalidSecretEncoding)
        );
    }

    #[test]
    fn hash_is_stable_and_hides_the_secret() {
        let secret = ApiTokenSecret::from_bytes([0x01; API_TOKEN_SECRET_BYTES]);

        let hash = hash_api_token(&secret);

        assert_eq!(hash, hash_api_token(&secret));
        assert_eq!(hash.len(), 64);
        assert!(!format_api_token(&secret).contains(&hash));
    }

    #[test]
    fn generated_secrets_differ() {
        assert_ne!(generate_api_token_secret(), generate_api_token_secret());
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = ApiTokenSecret::from_bytes([0xFF; API_TOKEN_SECRET_BYTES]);

        assert_eq!(format!("{secret:?}"), "ApiTokenSecret(**redacted**)");
    }
}
