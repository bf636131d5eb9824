//! User Management Handlers
//!
//! REST surface for user records. Every route here demands an authenticated
//! identity via the [`AuthContext`] extractor; deletion additionally
//! requires the admin role.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthContext;
use crate::error::AppError;
use crate::password;
use crate::users::store::User;

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

/// A user record as exposed over the API. The credential hash stays behind
/// in [`User`]; it must never appear in a response body.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        let mut roles: Vec<String> = user.roles.into_iter().collect();
        roles.sort_unstable();
        Self {
            id: user.id,
            username: user.username,
            roles,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// List all users.
pub async fn list_users(
    _ctx: AuthContext,
    State(state): State<AppState>,
) -> Json<Vec<UserView>> {
    let mut users: Vec<UserView> = state.store.list().into_iter().map(UserView::from).collect();
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Json(users)
}

/// Fetch a single user by username.
pub async fn get_user(
    _ctx: AuthContext,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserView>, AppError> {
    state
        .store
        .find_by_username(&username)
        .map(|user| Json(UserView::from(user)))
        .ok_or_else(|| AppError::not_found("No such user"))
}

/// Create a new user account.
pub async fn create_user(
    ctx: AuthContext,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    if input.username.trim().is_empty() || input.username.len() > 64 {
        return Err(AppError::validation("username must be 1-64 characters"));
    }
    // A padded username would key a distinct record that renders the same
    if input.username.trim() != input.username {
        return Err(AppError::validation(
            "username must not start or end with whitespace",
        ));
    }
    if input.password.is_empty() || input.password.len() > 128 {
        return Err(AppError::validation("password must be 1-128 characters"));
    }

    if state.store.find_by_username(&input.username).is_some() {
        return Err(AppError::conflict("Username already taken"));
    }

    let mut roles: HashSet<String> = input.roles.into_iter().collect();
    roles.insert(ROLE_USER.to_string());

    let password_hash = password::hash_password(&input.password)?;
    let user = state
        .store
        .save(User::new(input.username, password_hash, roles));

    info!(
        event = "user.created",
        username = %user.username,
        created_by = %ctx.subject,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

/// Delete a user account. Admin only.
pub async fn delete_user(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    if !ctx.has_role(ROLE_ADMIN) {
        warn!(
            event = "user.delete_denied",
            username = %username,
            requested_by = %ctx.subject,
            "Non-admin attempted user deletion"
        );
        return Err(AppError::forbidden("Admin role required"));
    }

    if !state.store.delete(&username) {
        return Err(AppError::not_found("No such user"));
    }

    info!(
        event = "user.deleted",
        username = %username,
        deleted_by = %ctx.subject,
        "User deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
