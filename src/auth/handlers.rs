//! Authentication Handlers
//!
//! Implements the login endpoint: verify submitted credentials against the
//! stored hash, mint a token on success.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::AppError;
use crate::password;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The token is the whole payload; its lifetime is readable from the `exp`
/// claim, so no second copy of it travels alongside.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Authenticate a user and issue a token.
///
/// Unknown user and wrong password take the same path out: one generic 401
/// with identical wording, so responses cannot be used to enumerate
/// usernames. The internal reason is logged, not returned.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state.store.find_by_username(&input.username);

    let verified = match &user {
        Some(user) => password::verify_password(&input.password, &user.password_hash),
        None => false,
    };

    if !verified {
        warn!(
            event = "auth.failed",
            username = %input.username,
            reason = if user.is_some() { "bad_password" } else { "unknown_user" },
            "Authentication failed"
        );
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .codec
        .mint(&input.username, Utc::now(), state.config.token_ttl)?;

    info!(
        event = "auth.success",
        username = %input.username,
        "User authenticated"
    );

    Ok(Json(LoginResponse { token }))
}
