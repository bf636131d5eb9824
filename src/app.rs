//! Application assembly
//!
//! Shared state, router construction, and first-run admin seeding.
//!
//! The authentication filter is layered over the whole router, public routes
//! included; it attaches identity but never rejects. Protected handlers
//! enforce authentication themselves by extracting
//! [`crate::auth::AuthContext`]. There is no transport-level session of any
//! kind: every request re-authenticates from its bearer token.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use anyhow::Result;
use tracing::info;

use crate::auth::{self, authenticate};
use crate::config::AppConfig;
use crate::password;
use crate::token::TokenCodec;
use crate::users::store::parse_roles;
use crate::users::{self, User, UserStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<TokenCodec>,
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn UserStore>) -> Result<Self> {
        let codec = TokenCodec::new(config.signing_secret.clone())
            .map_err(|e| anyhow::anyhow!("token codec setup failed: {}", e.message))?;
        Ok(Self {
            config: Arc::new(config),
            codec: Arc::new(codec),
            store,
        })
    }
}

/// Build the application router.
///
/// `/auth/login` and `/health` are public; everything under `/api` demands
/// an authenticated identity in its handlers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::handlers::login))
        .route(
            "/api/users",
            get(users::handlers::list_users).post(users::handlers::create_user),
        )
        .route(
            "/api/users/{username}",
            get(users::handlers::get_user).delete(users::handlers::delete_user),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}

/// Liveness check - always returns OK if server is running
async fn health() -> &'static str {
    "OK"
}

/// Create the bootstrap admin account if it does not exist yet.
///
/// Mirrors first-run provisioning: `admin` with both user and admin roles,
/// password from configuration. A pre-existing record is left untouched.
pub fn seed_admin(store: &dyn UserStore, admin_password: &str) -> Result<()> {
    if store.find_by_username("admin").is_some() {
        return Ok(());
    }

    let password_hash = password::hash_password(admin_password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {}", e.message))?;
    store.save(User::new(
        "admin",
        password_hash,
        parse_roles("ROLE_USER,ROLE_ADMIN"),
    ));

    info!(event = "user.seeded", username = "admin", "Admin user created");
    Ok(())
}
