//! Rate-limiting plugin operations.
//!
//! Two variants are supported with deliberately separate parameter sets:
//! the basic `rate-limiting` plugin (per-window counters, local/cluster/redis
//! policies) and `rate-limiting-advanced` (parallel limit/window arrays with a
//! sync/namespace model). The `fault_tolerant` flag is passed through to the
//! gateway verbatim; this layer enforces nothing around it.

use crate::client::{AdminClient, validate_page_size};
use crate::error::{AdminError, Result};
use crate::plugins::scoped_plugins_path;
use serde::Deserialize;
use serde_json::{Map, Value, json};

fn default_limit_by() -> String {
    "consumer".to_string()
}

fn default_policy() -> String {
    "local".to_string()
}

fn default_identifier() -> String {
    "consumer".to_string()
}

fn default_strategy() -> String {
    "local".to_string()
}

fn default_true() -> bool {
    true
}

fn default_redis_port() -> u16 {
    6379
}

fn default_redis_timeout() -> u32 {
    2000
}

fn default_list_name() -> String {
    "rate-limiting".to_string()
}

fn default_list_size() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRateLimiting {
    // Per-window limits; only the supplied windows reach the config object.
    #[serde(default)]
    pub second: Option<u64>,
    #[serde(default)]
    pub minute: Option<u64>,
    #[serde(default)]
    pub hour: Option<u64>,
    #[serde(default)]
    pub day: Option<u64>,
    #[serde(default)]
    pub month: Option<u64>,
    #[serde(default)]
    pub year: Option<u64>,
    /// Entity to count against: consumer, credential, ip, service, header,
    /// path, or consumer-group.
    #[serde(default = "default_limit_by")]
    pub limit_by: String,
    /// Counter policy: local, cluster, or redis.
    #[serde(default = "default_policy")]
    pub policy: String,
    /// Keep serving traffic if the counter store is unavailable.
    #[serde(default = "default_true")]
    pub fault_tolerant: bool,
    #[serde(default)]
    pub hide_client_headers: bool,
    #[serde(default)]
    pub redis_host: Option<String>,
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,
    #[serde(default)]
    pub redis_password: Option<String>,
    /// Redis connect timeout in milliseconds.
    #[serde(default = "default_redis_timeout")]
    pub redis_timeout: u32,
    #[serde(default)]
    pub redis_database: u32,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub consumer_id: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl CreateRateLimiting {
    fn payload(&self) -> Value {
        let mut config = Map::new();
        config.insert("limit_by".to_string(), json!(self.limit_by));
        config.insert("policy".to_string(), json!(self.policy));
        config.insert("fault_tolerant".to_string(), json!(self.fault_tolerant));
        config.insert(
            "hide_client_headers".to_string(),
            json!(self.hide_client_headers),
        );

        let windows = [
            ("second", self.second),
            ("minute", self.minute),
            ("hour", self.hour),
            ("day", self.day),
            ("month", self.month),
            ("year", self.year),
        ];
        for (name, value) in windows {
            if let Some(v) = value {
                config.insert(name.to_string(), json!(v));
            }
        }

        // The redis block is only meaningful under the redis policy.
        if self.policy == "redis" {
            if let Some(host) = &self.redis_host {
                config.insert("redis_host".to_string(), json!(host));
            }
            config.insert("redis_port".to_string(), json!(self.redis_port));
            config.insert("redis_timeout".to_string(), json!(self.redis_timeout));
            config.insert("redis_database".to_string(), json!(self.redis_database));
            if let Some(password) = &self.redis_password {
                config.insert("redis_password".to_string(), json!(password));
            }
        }

        let mut plugin = Map::new();
        plugin.insert("name".to_string(), json!("rate-limiting"));
        plugin.insert("config".to_string(), Value::Object(config));
        plugin.insert("enabled".to_string(), json!(self.enabled));
        if let Some(tags) = &self.tags {
            plugin.insert("tags".to_string(), json!(tags));
        }
        Value::Object(plugin)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListRateLimiting {
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub consumer_id: Option<String>,
    /// Plugin name filter; pass `rate-limiting-advanced` for the advanced
    /// variant.
    #[serde(default = "default_list_name")]
    pub name: String,
    #[serde(default = "default_list_size")]
    pub size: u32,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRateLimiting {
    pub plugin_id: String,
    #[serde(default)]
    pub second: Option<u64>,
    #[serde(default)]
    pub minute: Option<u64>,
    #[serde(default)]
    pub hour: Option<u64>,
    #[serde(default)]
    pub day: Option<u64>,
    #[serde(default)]
    pub month: Option<u64>,
    #[serde(default)]
    pub year: Option<u64>,
    #[serde(default)]
    pub limit_by: Option<String>,
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default)]
    pub fault_tolerant: Option<bool>,
    #[serde(default)]
    pub hide_client_headers: Option<bool>,
    #[serde(default)]
    pub redis_host: Option<String>,
    #[serde(default)]
    pub redis_port: Option<u16>,
    #[serde(default)]
    pub redis_password: Option<String>,
    #[serde(default)]
    pub redis_timeout: Option<u32>,
    #[serde(default)]
    pub redis_database: Option<u32>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdateRateLimiting {
    fn payload(&self) -> Value {
        let mut config = Map::new();
        let windows = [
            ("second", self.second),
            ("minute", self.minute),
            ("hour", self.hour),
            ("day", self.day),
            ("month", self.month),
            ("year", self.year),
        ];
        for (name, value) in windows {
            if let Some(v) = value {
                config.insert(name.to_string(), json!(v));
            }
        }
        if let Some(v) = &self.limit_by {
            config.insert("limit_by".to_string(), json!(v));
        }
        if let Some(v) = &self.policy {
            config.insert("policy".to_string(), json!(v));
        }
        if let Some(v) = self.fault_tolerant {
            config.insert("fault_tolerant".to_string(), json!(v));
        }
        if let Some(v) = self.hide_client_headers {
            config.insert("hide_client_headers".to_string(), json!(v));
        }
        if let Some(v) = &self.redis_host {
            config.insert("redis_host".to_string(), json!(v));
        }
        if let Some(v) = self.redis_port {
            config.insert("redis_port".to_string(), json!(v));
        }
        if let Some(v) = &self.redis_password {
            config.insert("redis_password".to_string(), json!(v));
        }
        if let Some(v) = self.redis_timeout {
            config.insert("redis_timeout".to_string(), json!(v));
        }
        if let Some(v) = self.redis_database {
            config.insert("redis_database".to_string(), json!(v));
        }

        let mut plugin = Map::new();
        if !config.is_empty() {
            plugin.insert("config".to_string(), Value::Object(config));
        }
        if let Some(v) = self.enabled {
            plugin.insert("enabled".to_string(), json!(v));
        }
        if let Some(tags) = &self.tags {
            plugin.insert("tags".to_string(), json!(tags));
        }
        Value::Object(plugin)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRateLimitingAdvanced {
    /// One limit per window, parallel to `window_size`.
    pub limit: Vec<u64>,
    /// Window lengths in seconds, parallel to `limit`.
    pub window_size: Vec<u64>,
    #[serde(default = "default_identifier")]
    pub identifier: String,
    /// `fixed` or `sliding`.
    #[serde(default)]
    pub window_type: Option<String>,
    /// Counter sync interval in seconds; -1 = synchronous.
    #[serde(default)]
    pub sync_rate: Option<f64>,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Counter strategy: local, cluster, or redis.
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub hide_client_headers: Option<bool>,
    #[serde(default)]
    pub retry_after_jitter_max: Option<u64>,
    /// Redis connection object, passed through verbatim.
    #[serde(default)]
    pub redis: Option<Value>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub consumer_id: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl CreateRateLimitingAdvanced {
    fn validate(&self) -> Result<()> {
        if self.limit.is_empty() {
            return Err(AdminError::InvalidParam(
                "limit must contain at least one entry".to_string(),
            ));
        }
        if self.limit.len() != self.window_size.len() {
            return Err(AdminError::InvalidParam(format!(
                "limit and window_size must be the same length ({} vs {})",
                self.limit.len(),
                self.window_size.len()
            )));
        }
        Ok(())
    }

    fn payload(&self) -> Value {
        let mut config = Map::new();
        config.insert("limit".to_string(), json!(self.limit));
        config.insert("window_size".to_string(), json!(self.window_size));
        config.insert("identifier".to_string(), json!(self.identifier));
        config.insert("strategy".to_string(), json!(self.strategy));
        if let Some(v) = &self.window_type {
            config.insert("window_type".to_string(), json!(v));
        }
        if let Some(v) = self.sync_rate {
            config.insert("sync_rate".to_string(), json!(v));
        }
        if let Some(v) = &self.namespace {
            config.insert("namespace".to_string(), json!(v));
        }
        if let Some(v) = self.hide_client_headers {
            config.insert("hide_client_headers".to_string(), json!(v));
        }
        if let Some(v) = self.retry_after_jitter_max {
            config.insert("retry_after_jitter_max".to_string(), json!(v));
        }
        if let Some(redis) = &self.redis {
            config.insert("redis".to_string(), redis.clone());
        }

        let mut plugin = Map::new();
        plugin.insert("name".to_string(), json!("rate-limiting-advanced"));
        plugin.insert("config".to_string(), Value::Object(config));
        plugin.insert("enabled".to_string(), json!(self.enabled));
        if let Some(tags) = &self.tags {
            plugin.insert("tags".to_string(), json!(tags));
        }
        Value::Object(plugin)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRateLimitingAdvanced {
    pub plugin_id: String,
    #[serde(default)]
    pub limit: Option<Vec<u64>>,
    #[serde(default)]
    pub window_size: Option<Vec<u64>>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub window_type: Option<String>,
    #[serde(default)]
    pub sync_rate: Option<f64>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub hide_client_headers: Option<bool>,
    #[serde(default)]
    pub retry_after_jitter_max: Option<u64>,
    #[serde(default)]
    pub redis: Option<Value>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UpdateRateLimitingAdvanced {
    fn validate(&self) -> Result<()> {
        if let (Some(limit), Some(window_size)) = (&self.limit, &self.window_size)
            && limit.len() != window_size.len()
        {
            return Err(AdminError::InvalidParam(format!(
                "limit and window_size must be the same length ({} vs {})",
                limit.len(),
                window_size.len()
            )));
        }
        Ok(())
    }

    fn payload(&self) -> Value {
        let mut config = Map::new();
        if let Some(v) = &self.limit {
            config.insert("limit".to_string(), json!(v));
        }
        if let Some(v) = &self.window_size {
            config.insert("window_size".to_string(), json!(v));
        }
        if let Some(v) = &self.identifier {
            config.insert("identifier".to_string(), json!(v));
        }
        if let Some(v) = &self.window_type {
            config.insert("window_type".to_string(), json!(v));
        }
        if let Some(v) = self.sync_rate {
            config.insert("sync_rate".to_string(), json!(v));
        }
        if let Some(v) = &self.namespace {
            config.insert("namespace".to_string(), json!(v));
        }
        if let Some(v) = &self.strategy {
            config.insert("strategy".to_string(), json!(v));
        }
        if let Some(v) = self.hide_client_headers {
            config.insert("hide_client_headers".to_string(), json!(v));
        }
        if let Some(v) = self.retry_after_jitter_max {
            config.insert("retry_after_jitter_max".to_string(), json!(v));
        }
        if let Some(redis) = &self.redis {
            config.insert("redis".to_string(), redis.clone());
        }

        let mut plugin = Map::new();
        if !config.is_empty() {
            plugin.insert("config".to_string(), Value::Object(config));
        }
        if let Some(v) = self.enabled {
            plugin.insert("enabled".to_string(), json!(v));
        }
        if let Some(tags) = &self.tags {
            plugin.insert("tags".to_string(), json!(tags));
        }
        Value::Object(plugin)
    }
}

pub async fn create_rate_limiting(
    client: &AdminClient,
    req: &CreateRateLimiting,
) -> Result<Value> {
    let path = scoped_plugins_path(
        req.service_id.as_deref(),
        req.route_id.as_deref(),
        req.consumer_id.as_deref(),
    );
    client.post(&path, &req.payload()).await
}

pub async fn list_rate_limiting(client: &AdminClient, req: &ListRateLimiting) -> Result<Value> {
    validate_page_size(Some(req.size))?;
    let path = scoped_plugins_path(
        req.service_id.as_deref(),
        req.route_id.as_deref(),
        req.consumer_id.as_deref(),
    );

    let mut query = vec![
        ("name".to_string(), req.name.clone()),
        ("size".to_string(), req.size.to_string()),
    ];
    if let Some(offset) = &req.offset {
        query.push(("offset".to_string(), offset.clone()));
    }
    if let Some(tags) = &req.tags {
        query.push(("tags".to_string(), tags.clone()));
    }

    client.get(&path, &query).await
}

pub async fn update_rate_limiting(
    client: &AdminClient,
    req: &UpdateRateLimiting,
) -> Result<Value> {
    client
        .patch(&format!("/plugins/{}", req.plugin_id), &req.payload())
        .await
}

/// Delete a rate-limiting plugin (either variant) by id.
///
/// The admin API answers with an empty 204, so a confirmation object is
/// synthesized for the caller.
pub async fn delete_rate_limiting(client: &AdminClient, plugin_id: &str) -> Result<Value> {
    client.delete(&format!("/plugins/{plugin_id}")).await?;
    Ok(json!({
        "message": "rate limiting plugin deleted",
        "plugin_id": plugin_id,
    }))
}

pub async fn create_rate_limiting_advanced(
    client: &AdminClient,
    req: &CreateRateLimitingAdvanced,
) -> Result<Value> {
    req.validate()?;
    let path = scoped_plugins_path(
        req.service_id.as_deref(),
        req.route_id.as_deref(),
        req.consumer_id.as_deref(),
    );
    client.post(&path, &req.payload()).await
}

pub async fn update_rate_limiting_advanced(
    client: &AdminClient,
    req: &UpdateRateLimitingAdvanced,
) -> Result<Value> {
    req.validate()?;
    client
        .patch(&format!("/plugins/{}", req.plugin_id), &req.payload())
        .await
}
