//! Compile-time tool registry.
//!
//! Manifest entries reference handlers by `module`/`function` name; those
//! names resolve against the [`ToolHandler`] enum through an explicit match,
//! so an entry that does not resolve fails the whole load before the
//! transport ever binds. There is no reflective lookup and no hot-reload:
//! the registry goes from unloaded to bound exactly once.

use crate::error::{Result, ServerError};
use crate::manifest::ToolManifest;
use kong_admin_tools::{
    AdminClient, AdminError, plugins, rate_limiting, routes, services, status,
};
use rmcp::model::{JsonObject, Tool, ToolAnnotations};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

/// Every invokable tool, one variant per admin operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolHandler {
    HelloWorld,
    AdminStatus,
    ListServices,
    GetService,
    CreateService,
    UpdateService,
    DeleteService,
    ListRoutes,
    GetRoute,
    CreateRoute,
    UpdateRoute,
    DeleteRoute,
    ListPlugins,
    GetPlugin,
    DeletePlugin,
    CreateRateLimiting,
    ListRateLimiting,
    UpdateRateLimiting,
    DeleteRateLimiting,
    CreateRateLimitingAdvanced,
    UpdateRateLimitingAdvanced,
}

impl ToolHandler {
    /// Resolve a manifest `module`/`function` pair to a handler.
    #[must_use]
    pub fn resolve(module: &str, function: &str) -> Option<Self> {
        match (module, function) {
            ("basic", "hello_world") => Some(Self::HelloWorld),
            ("status", "admin_status") => Some(Self::AdminStatus),
            ("services", "list_services") => Some(Self::ListServices),
            ("services", "get_service") => Some(Self::GetService),
            ("services", "create_service") => Some(Self::CreateService),
            ("services", "update_service") => Some(Self::UpdateService),
            ("services", "delete_service") => Some(Self::DeleteService),
            ("routes", "list_routes") => Some(Self::ListRoutes),
            ("routes", "get_route") => Some(Self::GetRoute),
            ("routes", "create_route") => Some(Self::CreateRoute),
            ("routes", "update_route") => Some(Self::UpdateRoute),
            ("routes", "delete_route") => Some(Self::DeleteRoute),
            ("plugins", "list_plugins") => Some(Self::ListPlugins),
            ("plugins", "get_plugin") => Some(Self::GetPlugin),
            ("plugins", "delete_plugin") => Some(Self::DeletePlugin),
            ("rate_limiting", "create_rate_limiting") => Some(Self::CreateRateLimiting),
            ("rate_limiting", "list_rate_limiting") => Some(Self::ListRateLimiting),
            ("rate_limiting", "update_rate_limiting") => Some(Self::UpdateRateLimiting),
            ("rate_limiting", "delete_rate_limiting") => Some(Self::DeleteRateLimiting),
            ("rate_limiting", "create_rate_limiting_advanced") => {
                Some(Self::CreateRateLimitingAdvanced)
            }
            ("rate_limiting", "update_rate_limiting_advanced") => {
                Some(Self::UpdateRateLimitingAdvanced)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn default_description(&self) -> &'static str {
        match self {
            Self::HelloWorld => "Connectivity self-test; returns a greeting without touching the admin API",
            Self::AdminStatus => "Fetch the admin API /status report",
            Self::ListServices => "List services, optionally filtered by tags",
            Self::GetService => "Fetch a single service by id or name",
            Self::CreateService => "Create a service pointing at an upstream URL",
            Self::UpdateService => "Update fields of an existing service; omitted fields stay unchanged",
            Self::DeleteService => "Delete a service by id or name",
            Self::ListRoutes => "List routes, optionally filtered by tags",
            Self::GetRoute => "Fetch a single route by id or name",
            Self::CreateRoute => "Create a route attached to a service",
            Self::UpdateRoute => "Update fields of an existing route; omitted fields stay unchanged",
            Self::DeleteRoute => "Delete a route by id or name",
            Self::ListPlugins => "List plugins globally or scoped to a service, route, or consumer",
            Self::GetPlugin => "Fetch a single plugin by id",
            Self::DeletePlugin => "Delete a plugin by id",
            Self::CreateRateLimiting => "Create a rate-limiting plugin with per-window limits",
            Self::ListRateLimiting => "List rate-limiting plugins, optionally scoped",
            Self::UpdateRateLimiting => "Update a rate-limiting plugin's configuration",
            Self::DeleteRateLimiting => "Delete a rate-limiting plugin by id",
            Self::CreateRateLimitingAdvanced => {
                "Create a rate-limiting-advanced plugin with windowed limits"
            }
            Self::UpdateRateLimitingAdvanced => {
                "Update a rate-limiting-advanced plugin's configuration"
            }
        }
    }

    /// Tool hints derived from the underlying HTTP method semantics
    /// (RFC 9110): GETs are read-only and idempotent, POSTs neither,
    /// PATCHes destructive with unknown idempotency, DELETEs destructive
    /// and idempotent.
    #[must_use]
    pub fn annotations(&self) -> ToolAnnotations {
        match self {
            Self::HelloWorld => ToolAnnotations {
                title: None,
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                open_world_hint: Some(false),
            },
            Self::AdminStatus
            | Self::ListServices
            | Self::GetService
            | Self::ListRoutes
            | Self::GetRoute
            | Self::ListPlugins
            | Self::GetPlugin
            | Self::ListRateLimiting => ToolAnnotations {
                title: None,
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                open_world_hint: Some(true),
            },
            Self::CreateService
            | Self::CreateRoute
            | Self::CreateRateLimiting
            | Self::CreateRateLimitingAdvanced => ToolAnnotations {
                title: None,
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                idempotent_hint: Some(false),
                open_world_hint: Some(true),
            },
            Self::UpdateService
            | Self::UpdateRoute
            | Self::UpdateRateLimiting
            | Self::UpdateRateLimitingAdvanced => ToolAnnotations {
                title: None,
                read_only_hint: Some(false),
                destructive_hint: Some(true),
                // PATCH may or may not be idempotent; do not guess.
                idempotent_hint: None,
                open_world_hint: Some(true),
            },
            Self::DeleteService
            | Self::DeleteRoute
            | Self::DeletePlugin
            | Self::DeleteRateLimiting => ToolAnnotations {
                title: None,
                read_only_hint: Some(false),
                destructive_hint: Some(true),
                idempotent_hint: Some(true),
                open_world_hint: Some(true),
            },
        }
    }

    /// JSON Schema for the tool's arguments.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn input_schema(&self) -> Value {
        match self {
            Self::HelloWorld | Self::AdminStatus => json!({
                "type": "object",
                "properties": {}
            }),
            Self::ListServices | Self::ListRoutes => json!({
                "type": "object",
                "properties": {
                    "size": {"type": "integer", "minimum": 1, "maximum": 1000},
                    "offset": {"type": "string", "description": "Pagination cursor from a previous page"},
                    "tags": {"type": "string"}
                }
            }),
            Self::GetService | Self::DeleteService => json!({
                "type": "object",
                "required": ["service_id"],
                "properties": {
                    "service_id": {"type": "string", "description": "Service id or name"}
                }
            }),
            Self::CreateService => json!({
                "type": "object",
                "required": ["name", "url"],
                "properties": {
                    "name": {"type": "string"},
                    "url": {"type": "string", "description": "Upstream URL, e.g. http://host:port/path"},
                    "protocol": {"type": "string"},
                    "host": {"type": "string"},
                    "port": {"type": "integer"},
                    "path": {"type": "string"},
                    "retries": {"type": "integer"},
                    "connect_timeout": {"type": "integer"},
                    "write_timeout": {"type": "integer"},
                    "read_timeout": {"type": "integer"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            Self::UpdateService => json!({
                "type": "object",
                "required": ["service_id"],
                "properties": {
                    "service_id": {"type": "string", "description": "Service id or name"},
                    "name": {"type": "string"},
                    "url": {"type": "string"},
                    "protocol": {"type": "string"},
                    "host": {"type": "string"},
                    "port": {"type": "integer"},
                    "path": {"type": "string"},
                    "retries": {"type": "integer"},
                    "connect_timeout": {"type": "integer"},
                    "write_timeout": {"type": "integer"},
                    "read_timeout": {"type": "integer"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            Self::GetRoute | Self::DeleteRoute => json!({
                "type": "object",
                "required": ["route_id"],
                "properties": {
                    "route_id": {"type": "string", "description": "Route id or name"}
                }
            }),
            Self::CreateRoute => json!({
                "type": "object",
                "required": ["service_id"],
                "properties": {
                    "service_id": {"type": "string", "description": "Service this route forwards to"},
                    "name": {"type": "string"},
                    "protocols": {"type": "array", "items": {"type": "string"}},
                    "methods": {"type": "array", "items": {"type": "string"}},
                    "hosts": {"type": "array", "items": {"type": "string"}},
                    "paths": {"type": "array", "items": {"type": "string"}},
                    "strip_path": {"type": "boolean"},
                    "preserve_host": {"type": "boolean"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            Self::UpdateRoute => json!({
                "type": "object",
                "required": ["route_id"],
                "properties": {
                    "route_id": {"type": "string"},
                    "service_id": {"type": "string", "description": "Re-home the route onto another service"},
                    "name": {"type": "string"},
                    "protocols": {"type": "array", "items": {"type": "string"}},
                    "methods": {"type": "array", "items": {"type": "string"}},
                    "hosts": {"type": "array", "items": {"type": "string"}},
                    "paths": {"type": "array", "items": {"type": "string"}},
                    "strip_path": {"type": "boolean"},
                    "preserve_host": {"type": "boolean"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            Self::ListPlugins => json!({
                "type": "object",
                "properties": {
                    "service_id": {"type": "string"},
                    "route_id": {"type": "string"},
                    "consumer_id": {"type": "string"},
                    "name": {"type": "string", "description": "Filter by plugin name"},
                    "size": {"type": "integer", "minimum": 1, "maximum": 1000},
                    "offset": {"type": "string"},
                    "tags": {"type": "string"}
                }
            }),
            Self::GetPlugin | Self::DeletePlugin | Self::DeleteRateLimiting => json!({
                "type": "object",
                "required": ["plugin_id"],
                "properties": {
                    "plugin_id": {"type": "string"}
                }
            }),
            Self::CreateRateLimiting => json!({
                "type": "object",
                "properties": {
                    "second": {"type": "integer"},
                    "minute": {"type": "integer"},
                    "hour": {"type": "integer"},
                    "day": {"type": "integer"},
                    "month": {"type": "integer"},
                    "year": {"type": "integer"},
                    "limit_by": {
                        "type": "string",
                        "enum": ["consumer", "credential", "ip", "service", "header", "path", "consumer-group"],
                        "default": "consumer"
                    },
                    "policy": {"type": "string", "enum": ["local", "cluster", "redis"], "default": "local"},
                    "fault_tolerant": {"type": "boolean", "default": true},
                    "hide_client_headers": {"type": "boolean", "default": false},
                    "redis_host": {"type": "string"},
                    "redis_port": {"type": "integer", "default": 6379},
                    "redis_password": {"type": "string"},
                    "redis_timeout": {"type": "integer", "default": 2000},
                    "redis_database": {"type": "integer", "default": 0},
                    "service_id": {"type": "string"},
                    "route_id": {"type": "string"},
                    "consumer_id": {"type": "string"},
                    "enabled": {"type": "boolean", "default": true},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            Self::ListRateLimiting => json!({
                "type": "object",
                "properties": {
                    "service_id": {"type": "string"},
                    "route_id": {"type": "string"},
                    "consumer_id": {"type": "string"},
                    "name": {"type": "string", "default": "rate-limiting"},
                    "size": {"type": "integer", "minimum": 1, "maximum": 1000, "default": 100},
                    "offset": {"type": "string"},
                    "tags": {"type": "string"}
                }
            }),
            Self::UpdateRateLimiting => json!({
                "type": "object",
                "required": ["plugin_id"],
                "properties": {
                    "plugin_id": {"type": "string"},
                    "second": {"type": "integer"},
                    "minute": {"type": "integer"},
                    "hour": {"type": "integer"},
                    "day": {"type": "integer"},
                    "month": {"type": "integer"},
                    "year": {"type": "integer"},
                    "limit_by": {"type": "string"},
                    "policy": {"type": "string"},
                    "fault_tolerant": {"type": "boolean"},
                    "hide_client_headers": {"type": "boolean"},
                    "redis_host": {"type": "string"},
                    "redis_port": {"type": "integer"},
                    "redis_password": {"type": "string"},
                    "redis_timeout": {"type": "integer"},
                    "redis_database": {"type": "integer"},
                    "enabled": {"type": "boolean"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            Self::CreateRateLimitingAdvanced => json!({
                "type": "object",
                "required": ["limit", "window_size"],
                "properties": {
                    "limit": {"type": "array", "items": {"type": "integer"}, "description": "One limit per window, parallel to window_size"},
                    "window_size": {"type": "array", "items": {"type": "integer"}, "description": "Window lengths in seconds"},
                    "identifier": {"type": "string", "default": "consumer"},
                    "window_type": {"type": "string", "enum": ["fixed", "sliding"]},
                    "sync_rate": {"type": "number"},
                    "namespace": {"type": "string"},
                    "strategy": {"type": "string", "enum": ["local", "cluster", "redis"], "default": "local"},
                    "hide_client_headers": {"type": "boolean"},
                    "retry_after_jitter_max": {"type": "integer"},
                    "redis": {"type": "object"},
                    "service_id": {"type": "string"},
                    "route_id": {"type": "string"},
                    "consumer_id": {"type": "string"},
                    "enabled": {"type": "boolean", "default": true},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
            Self::UpdateRateLimitingAdvanced => json!({
                "type": "object",
                "required": ["plugin_id"],
                "properties": {
                    "plugin_id": {"type": "string"},
                    "limit": {"type": "array", "items": {"type": "integer"}},
                    "window_size": {"type": "array", "items": {"type": "integer"}},
                    "identifier": {"type": "string"},
                    "window_type": {"type": "string", "enum": ["fixed", "sliding"]},
                    "sync_rate": {"type": "number"},
                    "namespace": {"type": "string"},
                    "strategy": {"type": "string"},
                    "hide_client_headers": {"type": "boolean"},
                    "retry_after_jitter_max": {"type": "integer"},
                    "redis": {"type": "object"},
                    "enabled": {"type": "boolean"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                }
            }),
        }
    }

    /// Execute the handler against the admin API.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParam` when the arguments do not deserialize, and
    /// propagates transport/status failures from the client.
    pub async fn invoke(
        &self,
        client: &AdminClient,
        args: Value,
    ) -> kong_admin_tools::Result<Value> {
        match self {
            Self::HelloWorld => Ok(json!(
                "Hello World from the Kong admin MCP server!"
            )),
            Self::AdminStatus => status::admin_status(client).await,
            Self::ListServices => {
                let req: services::ListServices = parse_args(args)?;
                services::list_services(client, &req).await
            }
            Self::GetService => {
                let req: services::ServiceRef = parse_args(args)?;
                services::get_service(client, &req.service_id).await
            }
            Self::CreateService => {
                let req: services::CreateService = parse_args(args)?;
                services::create_service(client, &req).await
            }
            Self::UpdateService => {
                let req: services::UpdateService = parse_args(args)?;
                services::update_service(client, &req).await
            }
            Self::DeleteService => {
                let req: services::ServiceRef = parse_args(args)?;
                services::delete_service(client, &req.service_id).await
            }
            Self::ListRoutes => {
                let req: routes::ListRoutes = parse_args(args)?;
                routes::list_routes(client, &req).await
            }
            Self::GetRoute => {
                let req: routes::RouteRef = parse_args(args)?;
                routes::get_route(client, &req.route_id).await
            }
            Self::CreateRoute => {
                let req: routes::CreateRoute = parse_args(args)?;
                routes::create_route(client, &req).await
            }
            Self::UpdateRoute => {
                let req: routes::UpdateRoute = parse_args(args)?;
                routes::update_route(client, &req).await
            }
            Self::DeleteRoute => {
                let req: routes::RouteRef = parse_args(args)?;
                routes::delete_route(client, &req.route_id).await
            }
            Self::ListPlugins => {
                let req: plugins::ListPlugins = parse_args(args)?;
                plugins::list_plugins(client, &req).await
            }
            Self::GetPlugin => {
                let req: plugins::PluginRef = parse_args(args)?;
                plugins::get_plugin(client, &req.plugin_id).await
            }
            Self::DeletePlugin => {
                let req: plugins::PluginRef = parse_args(args)?;
                plugins::delete_plugin(client, &req.plugin_id).await
            }
            Self::CreateRateLimiting => {
                let req: rate_limiting::CreateRateLimiting = parse_args(args)?;
                rate_limiting::create_rate_limiting(client, &req).await
            }
            Self::ListRateLimiting => {
                let req: rate_limiting::ListRateLimiting = parse_args(args)?;
                rate_limiting::list_rate_limiting(client, &req).await
            }
            Self::UpdateRateLimiting => {
                let req: rate_limiting::UpdateRateLimiting = parse_args(args)?;
                rate_limiting::update_rate_limiting(client, &req).await
            }
            Self::DeleteRateLimiting => {
                let req: plugins::PluginRef = parse_args(args)?;
                rate_limiting::delete_rate_limiting(client, &req.plugin_id).await
            }
            Self::CreateRateLimitingAdvanced => {
                let req: rate_limiting::CreateRateLimitingAdvanced = parse_args(args)?;
                rate_limiting::create_rate_limiting_advanced(client, &req).await
            }
            Self::UpdateRateLimitingAdvanced => {
                let req: rate_limiting::UpdateRateLimitingAdvanced = parse_args(args)?;
                rate_limiting::update_rate_limiting_advanced(client, &req).await
            }
        }
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> kong_admin_tools::Result<T> {
    serde_json::from_value(args).map_err(|e| AdminError::InvalidParam(e.to_string()))
}

/// A manifest entry bound to its handler.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub handler: ToolHandler,
}

/// Immutable registry of enabled tools, built once from the manifest.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Bind the manifest's enabled tools.
    ///
    /// Every entry must resolve to a handler, including disabled ones; a
    /// single unresolvable reference fails the whole load with no partial
    /// registration.
    ///
    /// # Errors
    ///
    /// Returns a manifest error naming the first unresolvable entry.
    pub fn from_manifest(manifest: &ToolManifest) -> Result<Self> {
        let mut tools = Vec::new();

        for (name, entry) in &manifest.tools {
            let handler = ToolHandler::resolve(&entry.module, &entry.function).ok_or_else(|| {
                ServerError::Manifest(format!(
                    "tool '{name}' references unknown handler {}::{}",
                    entry.module, entry.function
                ))
            })?;

            if !entry.enabled {
                tracing::debug!(tool = %name, "disabled in manifest; not binding");
                continue;
            }

            tools.push(RegisteredTool {
                name: name.clone(),
                description: entry
                    .description
                    .clone()
                    .unwrap_or_else(|| handler.default_description().to_string()),
                handler,
            });
        }

        Ok(Self { tools })
    }

    /// List the MCP `Tool`s exposed by this registry.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| {
                let schema_obj = t
                    .handler
                    .input_schema()
                    .as_object()
                    .cloned()
                    .unwrap_or_else(JsonObject::new);
                let mut tool =
                    Tool::new(t.name.clone(), t.description.clone(), Arc::new(schema_obj));
                tool.annotations = Some(t.handler.annotations());
                tool
            })
            .collect()
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
