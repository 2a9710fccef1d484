//! Admin authentication.
//!
//! Credentials are compared in constant time. HTML admin routes redirect to the
//! login page when the session is missing; the JSON admin API answers 401.

pub mod session;

pub use session::{cookie_value, take_flash, SessionStore, FLASH_COOKIE, SESSION_COOKIE};

use axum::{
    extract::{OriginalUri, Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::errors::AppError;
use crate::AppState;

/// Where a successful login lands when no `next` target is given.
pub const DEFAULT_LANDING: &str = "/admin";

/// Check a login attempt against the configured admin account.
///
/// Always false while no admin password is configured.
pub fn check_credentials(config: &Config, username: &str, password: &str) -> bool {
    let Some(expected) = config.admin_password.as_deref() else {
        tracing::warn!("Login attempted but CLUB_ADMIN_PASSWORD is not set");
        return false;
    };

    // Both comparisons always run.
    let user_ok = constant_time_compare(username, &config.admin_username);
    let pass_ok = constant_time_compare(password, expected);
    user_ok & pass_ok
}

/// Local redirect target from a `next` parameter, or the dashboard.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(target) if target.starts_with('/') && !target.starts_with("//") => target,
        _ => DEFAULT_LANDING,
    }
}

/// Session layer for the HTML admin panel.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(value) = cookie_value(request.headers(), SESSION_COOKIE) {
        if state.sessions.verify(&value).await {
            return next.run(request).await;
        }
    }

    // Form posts cannot be replayed through a redirect, so they land on the dashboard.
    // Inside a nested router the request URI has the `/admin` prefix stripped.
    let original = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or_else(|| request.uri());
    let target = if request.method() == Method::GET {
        original
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(DEFAULT_LANDING)
    } else {
        DEFAULT_LANDING
    };
    tracing::debug!(method = %request.method(), path = %original.path(), "Admin request without session");

    Redirect::to(&format!("/admin/login?next={}", encode_query_value(target))).into_response()
}

/// Token layer for the JSON admin API. Accepts a bearer token or the session cookie.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match session_credential(request.headers()) {
        Some(value) if state.sessions.verify(&value).await => next.run(request).await,
        Some(_) => unauthorized_response("Invalid or expired token"),
        None => unauthorized_response("Missing authentication token"),
    }
}

/// Session value presented by the client, bearer header first.
pub fn session_credential(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .or_else(|| cookie_value(headers, SESSION_COOKIE))
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

/// Percent-encode everything outside the RFC 3986 unreserved set and `/`.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with_password(password: Option<&str>) -> Config {
        let mut vars = HashMap::new();
        vars.insert("CLUB_ADMIN_USERNAME".to_string(), "admin".to_string());
        if let Some(password) = password {
            vars.insert("CLUB_ADMIN_PASSWORD".to_string(), password.to_string());
        }
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_constant_time_compare_empty() {
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("", "not-empty"));
    }

    #[test]
    fn test_check_credentials() {
        let config = config_with_password(Some("s3cret"));
        assert!(check_credentials(&config, "admin", "s3cret"));
        assert!(!check_credentials(&config, "admin", "wrong"));
        assert!(!check_credentials(&config, "root", "s3cret"));
    }

    #[test]
    fn test_no_password_refuses_every_login() {
        let config = config_with_password(None);
        assert!(!check_credentials(&config, "admin", ""));
    }

    #[test]
    fn test_safe_next_only_allows_local_paths() {
        assert_eq!(safe_next(Some("/admin/events")), "/admin/events");
        assert_eq!(safe_next(Some("https://evil.example")), DEFAULT_LANDING);
        assert_eq!(safe_next(Some("//evil.example")), DEFAULT_LANDING);
        assert_eq!(safe_next(None), DEFAULT_LANDING);
    }

    #[test]
    fn test_session_credential_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "club_session=from-cookie".parse().unwrap());
        assert_eq!(session_credential(&headers).as_deref(), Some("from-cookie"));

        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
        assert_eq!(session_credential(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_encode_query_value() {
        assert_eq!(
            encode_query_value("/admin/events?page=2&x=a b"),
            "/admin/events%3Fpage%3D2%26x%3Da%20b"
        );
    }
}
