//! Application Configuration
//!
//! Loads configuration from environment variables with secure defaults.
//! Everything is read exactly once at process start; there is no runtime
//! reconfiguration surface.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Duration;

/// Length of the token signing secret in bytes (256 bits for HMAC-SHA256).
pub const SECRET_LEN: usize = 32;

/// The process-wide token signing secret.
///
/// Decoded from a Base64-encoded environment value at startup and handed to
/// [`crate::token::TokenCodec`] by constructor injection. The raw bytes are
/// never logged; `Debug` prints a placeholder.
#[derive(Clone)]
pub struct SigningSecret([u8; SECRET_LEN]);

impl SigningSecret {
    /// Decode a Base64-encoded secret, requiring exactly [`SECRET_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .context("signing secret is not valid Base64")?;
        let bytes: [u8; SECRET_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            anyhow::anyhow!(
                "signing secret must decode to {} bytes, got {}",
                SECRET_LEN,
                b.len()
            )
        })?;
        Ok(Self(bytes))
    }

    /// Build a secret from raw bytes. Intended for tests with fixture keys.
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// JWT signing secret (Base64 in the environment, raw bytes here)
    pub signing_secret: SigningSecret,

    /// Token time-to-live
    pub token_ttl: Duration,

    /// Bootstrap password for the seeded admin account
    pub admin_password: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// - `JWT_SECRET` (required): Base64-encoded 256-bit signing secret
    /// - `JWT_TTL_MS` (default 3600000): token lifetime in milliseconds
    /// - `BIND_ADDR` (default `0.0.0.0:3000`)
    /// - `ADMIN_PASSWORD` (default `password`): first-run admin credential
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .context("JWT_SECRET environment variable required")?;
        let signing_secret =
            SigningSecret::from_base64(&secret).context("invalid JWT_SECRET")?;

        let ttl_ms: i64 = std::env::var("JWT_TTL_MS")
            .unwrap_or_else(|_| "3600000".into())
            .parse()
            .context("JWT_TTL_MS must be an integer number of milliseconds")?;
        if ttl_ms <= 0 {
            anyhow::bail!("JWT_TTL_MS must be positive");
        }

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "password".into());

        Ok(Self {
            bind_addr,
            signing_secret,
            token_ttl: Duration::milliseconds(ttl_ms),
            admin_password,
        })
    }
}
