//! Service resource operations.
//!
//! Services are remote resources; nothing is cached locally. Parameter
//! structs round-trip through serde so that optional fields omitted by the
//! caller never appear in the outgoing payload (partial-update semantics).

use crate::client::{AdminClient, query_pairs, validate_page_size};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filters for listing services. The upstream pagination envelope
/// (`{data, offset}`) is returned unmodified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListServices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRef {
    /// Service id or name.
    pub service_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateService {
    pub name: String,
    /// Upstream URL shorthand (`protocol://host:port/path`).
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Partial update: only supplied fields reach the PATCH body, so everything
/// omitted stays unchanged on the remote resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateService {
    /// Service id or name (path segment, never part of the body).
    #[serde(skip_serializing)]
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

pub async fn list_services(client: &AdminClient, req: &ListServices) -> Result<Value> {
    validate_page_size(req.size)?;
    client.get("/services", &query_pairs(req)?).await
}

pub async fn get_service(client: &AdminClient, service_id: &str) -> Result<Value> {
    client.get(&format!("/services/{service_id}"), &[]).await
}

pub async fn create_service(client: &AdminClient, req: &CreateService) -> Result<Value> {
    let payload = serde_json::to_value(req)?;
    client.post("/services", &payload).await
}

pub async fn update_service(client: &AdminClient, req: &UpdateService) -> Result<Value> {
    let payload = serde_json::to_value(req)?;
    client
        .patch(&format!("/services/{}", req.service_id), &payload)
        .await
}

pub async fn delete_service(client: &AdminClient, service_id: &str) -> Result<Value> {
    client.delete(&format!("/services/{service_id}")).await
}
