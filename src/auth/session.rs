//! Server-side admin sessions and the cookies that carry them.
//!
//! A session is a random token kept in memory with its expiry. The value handed
//! to clients is `<token>.<hex hmac-sha256 of token>`, so forged or truncated
//! cookies are rejected before the session table is consulted.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "club_session";

/// One-shot cookie carrying a status message to the next admin page.
pub const FLASH_COOKIE: &str = "club_flash";

/// In-memory session table. Sessions do not survive a restart.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
    key: Vec<u8>,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionStore {
    /// Create a store signing with `secret`, or with a random per-process key.
    pub fn new(secret: Option<&str>, ttl: Duration, secure_cookies: bool) -> Self {
        let key = match secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                let mut key = Uuid::new_v4().as_bytes().to_vec();
                key.extend_from_slice(Uuid::new_v4().as_bytes());
                key
            }
        };

        Self {
            sessions: RwLock::new(HashMap::new()),
            key,
            ttl,
            secure_cookies,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session and return its signed value.
    pub async fn issue(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.ttl;

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, expiry| *expiry > Utc::now());
        sessions.insert(token.clone(), expires_at);
        tracing::info!(active_sessions = sessions.len(), "Admin session started");

        format!("{}.{}", token, self.sign(&token))
    }

    /// Whether `value` is a correctly signed, live session.
    pub async fn verify(&self, value: &str) -> bool {
        let Some(token) = self.unsign(value) else {
            return false;
        };

        let expiry = self.sessions.read().await.get(token).copied();
        match expiry {
            Some(expiry) if expiry > Utc::now() => true,
            Some(_) => {
                self.sessions.write().await.remove(token);
                tracing::debug!("Admin session expired");
                false
            }
            None => false,
        }
    }

    /// End the session behind `value`, if any.
    pub async fn revoke(&self, value: &str) {
        if let Some(token) = self.unsign(value) {
            if self.sessions.write().await.remove(token).is_some() {
                tracing::info!("Admin session ended");
            }
        }
    }

    /// Drop every expired session and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, expiry| *expiry > now);
        before - sessions.len()
    }

    /// `Set-Cookie` value carrying a freshly issued session.
    pub fn session_cookie(&self, value: &str) -> String {
        build_cookie(
            SESSION_COOKIE,
            value,
            self.ttl.num_seconds(),
            self.secure_cookies,
        )
    }

    /// `Set-Cookie` value removing cookie `name`.
    pub fn clear_cookie(&self, name: &str) -> String {
        build_cookie(name, "", 0, self.secure_cookies)
    }

    /// `Set-Cookie` value for a flash message, readable once via [`take_flash`].
    pub fn flash_cookie(&self, message: &str) -> String {
        build_cookie(
            FLASH_COOKIE,
            &hex::encode(message.as_bytes()),
            60,
            self.secure_cookies,
        )
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).ok()
    }

    fn sign(&self, token: &str) -> String {
        match self.mac() {
            Some(mut mac) => {
                mac.update(token.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
            None => String::new(),
        }
    }

    fn unsign<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (token, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac()?;
        mac.update(token.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(token)
    }
}

fn build_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Decode the flash message, if the request carries one.
pub fn take_flash(headers: &HeaderMap) -> Option<String> {
    let raw = cookie_value(headers, FLASH_COOKIE)?;
    let bytes = hex::decode(raw).ok()?;
    String::from_utf8(bytes).ok().filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn store() -> SessionStore {
        SessionStore::new(Some("test-secret"), Duration::hours(1), false)
    }

    #[tokio::test]
    async fn test_issued_session_verifies() {
        let sessions = store();
        let value = sessions.issue().await;

        assert!(sessions.verify(&value).await);
        assert!(!sessions.verify("made-up-token").await);
    }

    #[tokio::test]
    async fn test_tampered_signature_is_rejected() {
        let sessions = store();
        let value = sessions.issue().await;
        let (token, _) = value.rsplit_once('.').unwrap();

        assert!(!sessions.verify(&format!("{}.{}", token, "00".repeat(32))).await);
        assert!(!sessions.verify(token).await);
    }

    #[tokio::test]
    async fn test_other_key_cannot_verify() {
        let a = store();
        let b = SessionStore::new(Some("another-secret"), Duration::hours(1), false);
        let value = a.issue().await;

        assert!(!b.verify(&value).await);
    }

    #[tokio::test]
    async fn test_revoke_ends_session() {
        let sessions = store();
        let value = sessions.issue().await;

        sessions.revoke(&value).await;
        assert!(!sessions.verify(&value).await);
    }

    #[tokio::test]
    async fn test_expired_sessions_fail_and_are_purged() {
        let sessions = SessionStore::new(Some("k"), Duration::seconds(-1), false);
        let first = sessions.issue().await;
        let _second = sessions.issue().await;

        assert!(!sessions.verify(&first).await);
        assert_eq!(sessions.purge_expired().await, 1);
        assert_eq!(sessions.sessions.read().await.len(), 0);
    }

    #[test]
    fn test_cookie_attributes() {
        let secure = SessionStore::new(None, Duration::hours(2), true);
        let cookie = secure.session_cookie("abc.def");

        assert!(cookie.starts_with("club_session=abc.def;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=7200"));
        assert!(cookie.ends_with("; Secure"));
        assert!(secure.clear_cookie(SESSION_COOKIE).contains("Max-Age=0"));
    }

    #[test]
    fn test_cookie_value_and_flash() {
        let sessions = store();
        let flash = sessions.flash_cookie("Event added");
        let flash_pair = flash.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; club_session=t.s"));
        headers.append(header::COOKIE, HeaderValue::from_str(flash_pair).unwrap());

        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("t.s"));
        assert_eq!(cookie_value(&headers, "missing"), None);
        assert_eq!(take_flash(&headers).as_deref(), Some("Event added"));
    }
}
