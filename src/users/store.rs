//! User Store
//!
//! The identity-lookup collaborator of the authentication core. Lookups are
//! pure reads that miss softly; the filter treats a miss exactly like a
//! verification failure so a deleted-but-tokened subject cannot be probed.
//!
//! Roles live in the data model as a genuine set. The comma-delimited role
//! string of legacy persistence exists only at this boundary, via
//! [`parse_roles`] and [`format_roles`].

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use uuid::Uuid;

/// A stored user account.
///
/// The username is unique and immutable after creation. `password_hash` is
/// an opaque PHC string owned by the hashing collaborator and must never be
/// serialized into a response.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub roles: HashSet<String>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: HashSet<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Identity lookup and persistence seam.
///
/// In-memory for now; a database-backed implementation plugs in here
/// without touching the auth core.
pub trait UserStore: Send + Sync {
    /// Resolve a username to its record. Soft miss: `None`, never an error.
    fn find_by_username(&self, username: &str) -> Option<User>;

    /// Insert or replace a record, keyed by username.
    fn save(&self, user: User) -> User;

    /// All records, in unspecified order.
    fn list(&self) -> Vec<User>;

    /// Remove a record. Returns whether anything was deleted.
    fn delete(&self, username: &str) -> bool;
}

/// Thread-safe in-memory user store.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_username(&self, username: &str) -> Option<User> {
        self.users.read().get(username).cloned()
    }

    fn save(&self, user: User) -> User {
        self.users
            .write()
            .insert(user.username.clone(), user.clone());
        user
    }

    fn list(&self) -> Vec<User> {
        self.users.read().values().cloned().collect()
    }

    fn delete(&self, username: &str) -> bool {
        self.users.write().remove(username).is_some()
    }
}

/// Parse a legacy comma-delimited role string into a role set.
///
/// Whitespace around entries is trimmed and empties dropped, so
/// `"ROLE_USER, ROLE_ADMIN"` and `"ROLE_USER,ROLE_ADMIN"` are equivalent.
pub fn parse_roles(delimited: &str) -> HashSet<String> {
    delimited
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}

/// Format a role set back into the delimited form, sorted for stability.
pub fn format_roles(roles: &HashSet<String>) -> String {
    let mut sorted: Vec<&str> = roles.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(",")
}
