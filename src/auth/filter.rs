//! Authentication Filter
//!
//! Runs once per inbound request, before route dispatch. Extracts a bearer
//! token, verifies it, resolves the subject through the user store, and on
//! success attaches an [`AuthContext`] to the request's extensions.
//!
//! Failures here are never fatal: a missing, invalid, or orphaned token
//! simply leaves the request unauthenticated and processing continues. The
//! actual reject decision belongs to the handlers, which demand an
//! `AuthContext` extractor on protected routes. A verification failure and
//! an unknown subject are deliberately indistinguishable to the client.

use std::collections::HashSet;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::app::AppState;
use crate::error::AppError;
use crate::token::VerifyError;

/// The per-request authenticated identity: verified subject plus the roles
/// resolved from the store. Owned by the request scope, discarded with it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject: String,
    pub roles: HashSet<String>,
}

impl AuthContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Extract the bearer token from request headers.
///
/// Returns the substring after the exact prefix `"Bearer "` (case-sensitive,
/// single space). Absent header, wrong prefix, or an empty remainder all
/// yield `None` - anonymous requests are a normal case, not an error.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Middleware that establishes the authenticated identity for a request.
///
/// Applied to every route, public ones included; it only attaches context,
/// never rejects.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.codec.verify(token, Utc::now()) {
            Ok(claims) => match state.store.find_by_username(claims.subject()) {
                Some(user) => {
                    request.extensions_mut().insert(AuthContext {
                        subject: user.username,
                        roles: user.roles,
                    });
                }
                None => {
                    // Valid token, vanished subject: proceed unauthenticated
                    warn!(
                        event = "auth.unknown_subject",
                        subject = %claims.subject(),
                        "Verified token for unknown subject"
                    );
                }
            },
            Err(VerifyError::Expired) => {
                debug!(event = "auth.token_expired", "Expired bearer token");
            }
            Err(reason) => {
                warn!(
                    event = "auth.token_rejected",
                    reason = %reason,
                    "Bearer token failed verification"
                );
            }
        }
    }

    next.run(request).await
}

/// Extractor for handlers on protected routes.
///
/// Rejects with 401 when the filter left the request unauthenticated.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::auth_failed("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_exact_substring() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn absent_header_is_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn wrong_prefix_is_none() {
        for value in ["Basic abc", "bearer abc", "BEARER abc", "Bearerabc", "Token abc"] {
            let headers = headers_with_auth(value);
            assert_eq!(bearer_token(&headers), None, "{value:?}");
        }
    }

    #[test]
    fn empty_token_is_none() {
        let headers = headers_with_auth("Bearer ");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn double_space_keeps_leading_space() {
        // The prefix is exactly "Bearer " with a single space; anything after
        // it is the token, verbatim
        let headers = headers_with_auth("Bearer  abc");
        assert_eq!(bearer_token(&headers), Some(" abc"));
    }

    #[test]
    fn role_membership() {
        let ctx = AuthContext {
            subject: "admin".into(),
            roles: ["ROLE_USER".to_string(), "ROLE_ADMIN".to_string()]
                .into_iter()
                .collect(),
        };
        assert!(ctx.has_role("ROLE_ADMIN"));
        assert!(!ctx.has_role("ROLE_AUDITOR"));
    }
}
