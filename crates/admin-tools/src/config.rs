//! Admin API connection settings.
//!
//! Settings are read from `KONG_*` environment variables once at startup and
//! are immutable afterwards. Authentication mode selection is exclusive by
//! construction: either HTTP basic (Community Edition), a bearer token
//! (Enterprise Edition), or nothing (local unauthenticated admin listener).

use crate::error::{AdminError, Result};
use std::time::Duration;

pub const DEFAULT_ADMIN_URL: &str = "http://localhost:8001";
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// How outgoing admin API requests authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAuth {
    /// No credentials attached.
    None,
    /// HTTP basic auth (`KONG_USERNAME` + `KONG_PASSWORD`).
    Basic { username: String, password: String },
    /// Bearer token (`KONG_API_TOKEN`).
    Token { token: String },
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Admin API base URL.
    pub base_url: String,
    pub auth: AdminAuth,
    /// Per-request timeout. On expiry the call fails; there are no retries.
    pub timeout: Duration,
    /// Verify TLS certificates on HTTPS admin endpoints.
    pub verify_tls: bool,
}

impl AdminConfig {
    /// Load settings from the process environment.
    ///
    /// Environment variables:
    /// - `KONG_ADMIN_URL` (default `http://localhost:8001`)
    /// - `KONG_USERNAME` / `KONG_PASSWORD` (basic auth, must be set together)
    /// - `KONG_API_TOKEN` (bearer token, exclusive with basic auth)
    /// - `KONG_TIMEOUT` (seconds, default `30.0`)
    /// - `KONG_VERIFY_SSL` (default `true`)
    ///
    /// # Errors
    ///
    /// Returns a config error when both credential modes are supplied, when
    /// only half of the basic pair is supplied, or when `KONG_TIMEOUT` /
    /// `KONG_VERIFY_SSL` do not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), but with an injected variable
    /// lookup so tests never have to mutate process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = get("KONG_ADMIN_URL").unwrap_or_else(|| DEFAULT_ADMIN_URL.to_string());

        let auth = resolve_auth(
            get("KONG_USERNAME"),
            get("KONG_PASSWORD"),
            get("KONG_API_TOKEN"),
        )?;

        let timeout = match get("KONG_TIMEOUT") {
            None => Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            Some(raw) => {
                let secs: f64 = raw.trim().parse().map_err(|_| {
                    AdminError::Config(format!("KONG_TIMEOUT is not a number: '{raw}'"))
                })?;
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(AdminError::Config(format!(
                        "KONG_TIMEOUT must be a positive number of seconds, got '{raw}'"
                    )));
                }
                Duration::from_secs_f64(secs)
            }
        };

        let verify_tls = match get("KONG_VERIFY_SSL") {
            None => true,
            Some(raw) => parse_truthy(&raw).ok_or_else(|| {
                AdminError::Config(format!("KONG_VERIFY_SSL is not a boolean: '{raw}'"))
            })?,
        };

        Ok(Self {
            base_url,
            auth,
            timeout,
            verify_tls,
        })
    }
}

fn resolve_auth(
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
) -> Result<AdminAuth> {
    let username = username.filter(|s| !s.is_empty());
    let password = password.filter(|s| !s.is_empty());
    let token = token.filter(|s| !s.is_empty());

    if token.is_some() && (username.is_some() || password.is_some()) {
        return Err(AdminError::Config(
            "KONG_API_TOKEN and KONG_USERNAME/KONG_PASSWORD are mutually exclusive".to_string(),
        ));
    }

    if let Some(token) = token {
        return Ok(AdminAuth::Token { token });
    }

    match (username, password) {
        (Some(username), Some(password)) => Ok(AdminAuth::Basic { username, password }),
        (None, None) => Ok(AdminAuth::None),
        _ => Err(AdminError::Config(
            "KONG_USERNAME and KONG_PASSWORD must be set together".to_string(),
        )),
    }
}

fn parse_truthy(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
