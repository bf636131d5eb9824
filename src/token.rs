//! JWT Token Handling
//!
//! Creates and validates JSON Web Tokens for stateless authentication.
//!
//! Tokens use the compact JWS form `header.claims.signature` with HS256
//! (HMAC-SHA256 over the Base64url-encoded header and claims). Signature
//! comparison is constant-time to avoid timing side-channels, and the
//! signature is checked before the claims are even parsed so a tampered
//! expiry never reaches the clock check.
//!
//! Expiry is evaluated against a caller-supplied instant rather than a
//! hidden clock read, which makes boundary behavior deterministic in tests:
//! a token is valid strictly before `exp` and invalid at `exp` itself.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::SigningSecret;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed JOSE header: this codec only ever signs with HS256.
const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued-at timestamp (Unix seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }
}

/// Why a token failed verification.
///
/// The variants are distinguished for logging and metrics only; clients see
/// a single generic authentication failure regardless of the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The string does not parse into header, claims, and signature
    #[error("token is malformed")]
    Malformed,
    /// The recomputed signature does not match (tampered or wrong secret)
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// The token's expiry instant has been reached
    #[error("token is expired")]
    Expired,
}

/// Mints and verifies signed tokens with an injected signing secret.
///
/// The codec holds no mutable state and is safe to share across any number
/// of concurrent requests.
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    /// Prepare a codec for the given secret.
    ///
    /// The HMAC key schedule is computed once here; signing and verifying
    /// clone the prepared state instead of re-keying per call.
    pub fn new(secret: SigningSecret) -> Result<Self, AppError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::internal(format!("HMAC key setup failed: {}", e)))?;
        Ok(Self { mac })
    }

    /// Mint a signed token for `subject`, valid from `issued_at` until
    /// `issued_at + ttl` (exclusive).
    ///
    /// Deterministic for identical inputs and secret.
    pub fn mint(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| AppError::internal(format!("Claims serialization failed: {}", e)))?;

        let mut token = String::new();
        token.push_str(&URL_SAFE_NO_PAD.encode(HEADER));
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(claims_json));
        let tag = self.sign(token.as_bytes());
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(tag));
        Ok(token)
    }

    /// Verify a token against the signing secret and the caller's `now`.
    ///
    /// Checks, in order: structure, signature, claim syntax, expiry. Returns
    /// the embedded claims on success.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, VerifyError> {
        let mut parts = token.split('.');
        let (header, claims, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(c), Some(s)) if parts.next().is_none() => (h, c, s),
            _ => return Err(VerifyError::Malformed),
        };

        let presented = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| VerifyError::Malformed)?;
        let signing_input = &token[..header.len() + 1 + claims.len()];
        let expected = self.sign(signing_input.as_bytes());
        if !bool::from(expected.ct_eq(&presented)) {
            return Err(VerifyError::SignatureInvalid);
        }

        let claims_json = URL_SAFE_NO_PAD
            .decode(claims)
            .map_err(|_| VerifyError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&claims_json).map_err(|_| VerifyError::Malformed)?;

        // Strict boundary: the expiry instant itself is already invalid
        if now.timestamp() >= claims.exp {
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}
