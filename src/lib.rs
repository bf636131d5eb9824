//! # Portcullis
//!
//! A small user-management REST API protected by stateless JWT bearer
//! authentication.
//!
//! The core is the token lifecycle: [`token::TokenCodec`] mints signed,
//! time-bounded tokens at login and verifies them on every request;
//! [`auth::filter`] intercepts each inbound request, reconstructs an
//! authenticated identity from the bearer header, and attaches it to the
//! request scope; handlers on protected routes enforce authentication by
//! extracting [`auth::AuthContext`].
//!
//! ## Request flow
//!
//! ```text
//! POST /auth/login ──► password check ──► TokenCodec::mint ──► {token}
//!
//! any request ──► authenticate (filter)
//!                   ├─ bearer_token()         absent? continue anonymous
//!                   ├─ TokenCodec::verify     invalid? continue anonymous
//!                   ├─ UserStore lookup       missing? continue anonymous
//!                   └─ attach AuthContext ──► handler extractors decide
//! ```
//!
//! Failures inside the filter never abort a request; rejection is the
//! business of the route that demands an identity. There is no server-side
//! session state: the token carries everything, bounded by its expiry and
//! the immutable process-wide signing secret.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod layers;
pub mod password;
pub mod token;
pub mod users;

// Re-exports
pub use app::{router, seed_admin, AppState};
pub use auth::{bearer_token, AuthContext};
pub use config::{AppConfig, SigningSecret};
pub use error::{AppError, ErrorKind};
pub use layers::SecureRouter;
pub use token::{Claims, TokenCodec, VerifyError};
pub use users::{InMemoryUserStore, User, UserStore};
