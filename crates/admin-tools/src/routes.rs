//! Route resource operations.
//!
//! Routes reference a service by id; the admin API expects the reference as
//! a nested `{"service": {"id": …}}` object, so the builders lift the flat
//! `service_id` parameter into that shape. Referential integrity between
//! services and routes is entirely the gateway's concern.

use crate::client::{AdminClient, query_pairs, validate_page_size};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRoutes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRef {
    /// Route id or name.
    pub route_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoute {
    /// Service this route forwards to.
    #[serde(skip_serializing)]
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_host: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl CreateRoute {
    fn payload(&self) -> Result<Value> {
        let mut payload = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut payload {
            map.insert("service".to_string(), json!({"id": self.service_id}));
        }
        Ok(payload)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoute {
    /// Route id or name (path segment, never part of the body).
    #[serde(skip_serializing)]
    pub route_id: String,
    /// Re-home the route onto another service.
    #[serde(default, skip_serializing)]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_path: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_host: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateRoute {
    fn payload(&self) -> Result<Value> {
        let mut payload = serde_json::to_value(self)?;
        if let (Value::Object(map), Some(service_id)) = (&mut payload, &self.service_id) {
            map.insert("service".to_string(), json!({"id": service_id}));
        }
        Ok(payload)
    }
}

pub async fn list_routes(client: &AdminClient, req: &ListRoutes) -> Result<Value> {
    validate_page_size(req.size)?;
    client.get("/routes", &query_pairs(req)?).await
}

pub async fn get_route(client: &AdminClient, route_id: &str) -> Result<Value> {
    client.get(&format!("/routes/{route_id}"), &[]).await
}

pub async fn create_route(client: &AdminClient, req: &CreateRoute) -> Result<Value> {
    client.post("/routes", &req.payload()?).await
}

pub async fn update_route(client: &AdminClient, req: &UpdateRoute) -> Result<Value> {
    client
        .patch(&format!("/routes/{}", req.route_id), &req.payload()?)
        .await
}

pub async fn delete_route(client: &AdminClient, route_id: &str) -> Result<Value> {
    client.delete(&format!("/routes/{route_id}")).await
}
