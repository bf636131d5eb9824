//! User Management
//!
//! The user record model, the store collaborator the auth core resolves
//! identities through, and the REST surface for managing accounts.

pub mod handlers;
pub mod store;

pub use store::{InMemoryUserStore, User, UserStore};
