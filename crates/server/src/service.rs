//! MCP service surface over the tool registry.
//!
//! Every invocation is a single request/response cycle: deserialize the
//! arguments, perform exactly one admin API call, and report the outcome.
//! Admin API rejections and transport failures become tool results with
//! `is_error` set so clients always receive a structured error object;
//! only unknown tools and bad arguments are JSON-RPC level errors.

use crate::registry::ToolRegistry;
use kong_admin_tools::{AdminClient, AdminError};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Clone)]
pub struct ToolServer {
    registry: Arc<ToolRegistry>,
    client: Arc<AdminClient>,
}

impl ToolServer {
    pub fn new(registry: Arc<ToolRegistry>, client: Arc<AdminClient>) -> Self {
        Self { registry, client }
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Manage Kong gateway configuration (services, routes, plugins, \
                 rate limiting) through the admin API."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.registry.list_tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let Some(tool) = self.registry.find(&request.name) else {
            return Err(ErrorData::invalid_params(
                format!("unknown tool: {}", request.name),
                None,
            ));
        };

        let args = request
            .arguments
            .map_or_else(|| json!({}), Value::Object);

        tracing::debug!(tool = %tool.name, "dispatching tool call");
        match tool.handler.invoke(&self.client, args).await {
            Ok(body) => {
                let text = serde_json::to_string(&body).unwrap_or_else(|_| body.to_string());
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(AdminError::InvalidParam(msg)) => Err(ErrorData::invalid_params(msg, None)),
            Err(err) => {
                tracing::debug!(tool = %tool.name, error = %err, "tool call failed");
                Ok(error_result(&err))
            }
        }
    }
}

/// Render an admin API failure as a structured tool error result.
fn error_result(err: &AdminError) -> CallToolResult {
    let body = match err {
        AdminError::Status {
            status,
            reason,
            body,
        } => json!({
            "error": {
                "kind": "status",
                "status": status,
                "reason": reason,
                "body": body,
            }
        }),
        AdminError::Transport(message) => json!({
            "error": {
                "kind": "transport",
                "message": message,
            }
        }),
        other => json!({
            "error": {
                "kind": "internal",
                "message": other.to_string(),
            }
        }),
    };

    let text = serde_json::to_string(&body).unwrap_or_else(|_| body.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: None,
        is_error: Some(true),
        meta: None,
    }
}
