//! Authentication
//!
//! Token-based authentication for every inbound request: the login handler
//! mints tokens, the filter reconstructs an identity from the bearer header
//! on each request, and handlers opt into enforcement by extracting
//! [`AuthContext`].

pub mod filter;
pub mod handlers;

pub use filter::{authenticate, bearer_token, AuthContext};
