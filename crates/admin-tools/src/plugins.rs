//! Generic plugin operations.
//!
//! Plugins can be scoped globally or to a service, route, or consumer. Scope
//! selects the endpoint, not the query string; when several scope ids are
//! supplied the most specific one wins (service > route > consumer), matching
//! the admin API's own nesting.

use crate::client::{AdminClient, query_pairs, validate_page_size};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) fn scoped_plugins_path(
    service_id: Option<&str>,
    route_id: Option<&str>,
    consumer_id: Option<&str>,
) -> String {
    if let Some(id) = service_id {
        format!("/services/{id}/plugins")
    } else if let Some(id) = route_id {
        format!("/routes/{id}/plugins")
    } else if let Some(id) = consumer_id {
        format!("/consumers/{id}/plugins")
    } else {
        "/plugins".to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPlugins {
    // Scope ids select the endpoint and never serialize into the query.
    #[serde(default, skip_serializing)]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub route_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub consumer_id: Option<String>,
    /// Filter by plugin name (e.g. `rate-limiting`, `rate-limiting-advanced`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRef {
    pub plugin_id: String,
}

/// List plugins, returning the upstream pagination envelope untouched.
pub async fn list_plugins(client: &AdminClient, req: &ListPlugins) -> Result<Value> {
    validate_page_size(req.size)?;
    let path = scoped_plugins_path(
        req.service_id.as_deref(),
        req.route_id.as_deref(),
        req.consumer_id.as_deref(),
    );
    client.get(&path, &query_pairs(req)?).await
}

pub async fn get_plugin(client: &AdminClient, plugin_id: &str) -> Result<Value> {
    client.get(&format!("/plugins/{plugin_id}"), &[]).await
}

pub async fn delete_plugin(client: &AdminClient, plugin_id: &str) -> Result<Value> {
    client.delete(&format!("/plugins/{plugin_id}")).await
}
