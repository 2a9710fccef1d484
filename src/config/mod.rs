//! Configuration module for the club site backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use chrono::{Duration, FixedOffset, Offset, Utc};

/// Upper bound for `CLUB_SESSION_TTL_HOURS` (30 days).
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 30;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin username
    pub admin_username: String,
    /// Admin password; logins are refused while unset
    pub admin_password: Option<String>,
    /// Key for signing session cookies
    pub session_secret: Option<String>,
    /// Lifetime of an admin session
    pub session_ttl: Duration,
    /// Mark cookies `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
    /// Static assets root, served under `/static`
    pub static_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Club-local UTC offset in minutes
    pub utc_offset_minutes: i32,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AddrParseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_username = lookup("CLUB_ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());
        let admin_password = lookup("CLUB_ADMIN_PASSWORD").filter(|p| !p.is_empty());
        let session_secret = lookup("CLUB_SESSION_SECRET").filter(|s| !s.is_empty());

        let session_ttl_hours = lookup("CLUB_SESSION_TTL_HOURS")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .map(|h| h.min(MAX_SESSION_TTL_HOURS))
            .unwrap_or(24);

        let secure_cookies = lookup("CLUB_SECURE_COOKIES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let data_dir = lookup("CLUB_DATA_DIR")
            .unwrap_or_else(|| "./data".to_string())
            .into();

        let static_dir = lookup("CLUB_STATIC_DIR")
            .unwrap_or_else(|| "./static".to_string())
            .into();

        let bind_addr = lookup("CLUB_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:5000".to_string())
            .parse()?;

        let utc_offset_minutes = lookup("CLUB_UTC_OFFSET_MINUTES")
            .and_then(|v| v.parse::<i32>().ok())
            .filter(|m| m.abs() < 24 * 60)
            .unwrap_or(330);

        let log_level = lookup("CLUB_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_json = lookup("CLUB_LOG_JSON")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            admin_username,
            admin_password,
            session_secret,
            session_ttl: Duration::hours(session_ttl_hours),
            secure_cookies,
            data_dir,
            static_dir,
            bind_addr,
            utc_offset_minutes,
            log_level,
            log_json,
        })
    }

    /// The club's local timezone.
    pub fn club_timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AddrParseError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.admin_username, "admin");
        assert!(config.admin_password.is_none());
        assert!(config.session_secret.is_none());
        assert_eq!(config.session_ttl, Duration::hours(24));
        assert!(!config.secure_cookies);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.static_dir, PathBuf::from("./static"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5000");
        assert_eq!(config.utc_offset_minutes, 330);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CLUB_ADMIN_USERNAME", "root"),
            ("CLUB_ADMIN_PASSWORD", "hunter2"),
            ("CLUB_SESSION_SECRET", "s3cret"),
            ("CLUB_SESSION_TTL_HOURS", "2"),
            ("CLUB_SECURE_COOKIES", "true"),
            ("CLUB_BIND_ADDR", "0.0.0.0:8080"),
            ("CLUB_UTC_OFFSET_MINUTES", "-300"),
        ])
        .unwrap();

        assert_eq!(config.admin_username, "root");
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.session_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.session_ttl, Duration::hours(2));
        assert!(config.secure_cookies);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.club_timezone().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_empty_password_counts_as_unset() {
        let config = config_from(&[("CLUB_ADMIN_PASSWORD", "")]).unwrap();
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_session_ttl_is_clamped() {
        let huge = i64::MAX.to_string();
        let config = config_from(&[("CLUB_SESSION_TTL_HOURS", huge.as_str())]).unwrap();
        assert_eq!(config.session_ttl, Duration::hours(MAX_SESSION_TTL_HOURS));

        let config = config_from(&[("CLUB_SESSION_TTL_HOURS", "-5")]).unwrap();
        assert_eq!(config.session_ttl, Duration::hours(24));
    }

    #[test]
    fn test_invalid_bind_addr_is_an_error() {
        assert!(config_from(&[("CLUB_BIND_ADDR", "not-an-addr")]).is_err());
    }
}
