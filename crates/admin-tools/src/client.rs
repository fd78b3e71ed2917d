//! Authenticated HTTP client for the Kong Admin API.
//!
//! The client is deliberately uniform: callers hand it a path, optional query
//! pairs, and an optional JSON body, and get decoded JSON back. Non-2xx
//! responses become [`AdminError::Status`] carrying the status code and the
//! decoded response body; nothing is retried.

use crate::config::{AdminAuth, AdminConfig};
use crate::error::{AdminError, Result};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;

#[derive(Debug)]
pub struct AdminClient {
    http: Client,
    config: AdminConfig,
}

impl AdminClient {
    /// Build a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error if the base URL does not parse or the HTTP
    /// client cannot be constructed for the requested TLS mode.
    pub fn new(config: AdminConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            AdminError::Config(format!("invalid KONG_ADMIN_URL '{}': {e}", config.base_url))
        })?;

        let mut builder = Client::builder();
        if !config.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(AdminError::from)?;

        Ok(Self { http, config })
    }

    /// Build a client straight from `KONG_*` environment variables.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from [`AdminConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(AdminConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, &[], None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = build_url(&self.config.base_url, path)?;
        tracing::debug!(method = %method, path = %path, "admin API request");

        let mut request = self
            .http
            .request(method, url)
            .timeout(self.config.timeout);
        request = apply_auth(&self.config.auth, request);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let decoded = decode_body(&bytes);

        if status.is_success() {
            Ok(decoded)
        } else {
            Err(AdminError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body: decoded,
            })
        }
    }
}

fn build_url(base_url: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| AdminError::Config(format!("invalid request URL: {e}")))
}

fn apply_auth(auth: &AdminAuth, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match auth {
        AdminAuth::Token { token } => request.bearer_auth(token),
        AdminAuth::Basic { username, password } => request.basic_auth(username, Some(password)),
        AdminAuth::None => request,
    }
}

/// Decode a response body as JSON, falling back to a string value.
///
/// The admin API answers DELETEs with an empty 204; that decodes to null.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Flatten a serializable filter struct into scalar query pairs.
///
/// Fields serialized as null are skipped; arrays are comma-joined the way the
/// admin API expects `tags` filters.
pub(crate) fn query_pairs<T: Serialize>(filters: &T) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(filters)?;
    let Value::Object(map) = value else {
        return Ok(Vec::new());
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(scalar_to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.push((key, joined));
            }
            other => pairs.push((key, scalar_to_string(&other))),
        }
    }
    Ok(pairs)
}

/// Page-size bounds accepted by the admin API.
pub(crate) fn validate_page_size(size: Option<u32>) -> Result<()> {
    match size {
        Some(s) if !(1..=1000).contains(&s) => Err(AdminError::InvalidParam(format!(
            "size must be between 1 and 1000, got {s}"
        ))),
        _ => Ok(()),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
