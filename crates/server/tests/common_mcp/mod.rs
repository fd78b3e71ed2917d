//! Minimal MCP client for the server's streamable HTTP endpoint (`/mcp`).
//!
//! This exists only for integration tests; it speaks just enough of the
//! protocol to initialize a session and issue JSON-RPC requests, reading the
//! first message off each response event stream.

use anyhow::Context as _;
use futures::StreamExt as _;
use serde_json::{Value, json};
use std::time::Duration;

pub struct McpSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl McpSession {
    pub async fn connect(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();

        let init_resp = post_mcp(
            &client,
            &base_url,
            None,
            json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "kong-mcp-server-integration-tests", "version": "0" }
                }
            }),
        )
        .await?;

        let session_id = init_resp
            .headers()
            .get("Mcp-Session-Id")
            .and_then(|h| h.to_str().ok())
            .context("missing Mcp-Session-Id header")?
            .to_string();

        let init_msg = read_first_message(init_resp).await?;
        anyhow::ensure!(
            init_msg.get("id") == Some(&json!(0)),
            "unexpected initialize response id: {init_msg}"
        );

        let initialized = post_mcp(
            &client,
            &base_url,
            Some(&session_id),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await?;
        anyhow::ensure!(
            initialized.status().as_u16() == 202,
            "notifications/initialized returned {}",
            initialized.status()
        );

        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    pub async fn request(
        &self,
        id: u64,
        method: &str,
        params: Value,
        timeout_dur: Duration,
    ) -> anyhow::Result<Value> {
        let resp = post_mcp(
            &self.client,
            &self.base_url,
            Some(&self.session_id),
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }),
        )
        .await?;

        tokio::time::timeout(timeout_dur, read_first_message(resp))
            .await
            .context("timeout waiting for response message")?
    }
}

/// Extract a tool call's body as JSON from a `tools/call` response message.
#[allow(dead_code)]
pub fn tool_call_body_json(msg: &Value) -> anyhow::Result<Value> {
    let text = msg
        .get("result")
        .and_then(|r| r.get("content"))
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("text"))
        .and_then(Value::as_str)
        .context("tools/call missing result.content[0].text")?;
    serde_json::from_str(text).context("tools/call text is not JSON")
}

/// True when a `tools/call` response message carries a tool-level error.
#[allow(dead_code)]
pub fn tool_call_is_error(msg: &Value) -> bool {
    msg.get("result")
        .and_then(|r| r.get("isError"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

async fn post_mcp(
    client: &reqwest::Client,
    base_url: &str,
    session_id: Option<&str>,
    body: Value,
) -> anyhow::Result<reqwest::Response> {
    let mut req = client
        .post(format!("{base_url}/mcp"))
        .header("Accept", "application/json, text/event-stream")
        .header("Content-Type", "application/json")
        .json(&body);

    if let Some(session_id) = session_id {
        req = req.header("Mcp-Session-Id", session_id);
    }

    req.send()
        .await
        .context("POST /mcp")?
        .error_for_status()
        .context("POST /mcp status")
}

/// Read the first JSON-RPC message off a response, whether the server
/// answered with plain JSON or an event stream.
async fn read_first_message(resp: reqwest::Response) -> anyhow::Result<Value> {
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(';').next().unwrap_or(s).trim().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type == "application/json" {
        return resp.json().await.context("parse JSON response");
    }

    let mut stream = resp.bytes_stream();
    let mut buf = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("read event stream")?;
        buf.push_str(&String::from_utf8_lossy(&chunk).replace("\r\n", "\n"));

        // SSE events are terminated by a blank line.
        while let Some(end) = buf.find("\n\n") {
            let event: String = buf.drain(..end + 2).collect();
            let data: Vec<String> = event
                .lines()
                .map(|l| l.trim_end_matches('\r'))
                .filter_map(|l| l.strip_prefix("data:"))
                .map(|l| l.trim().to_string())
                .collect();
            let payload = data.join("\n");
            // Priming events (SEP-1699) carry an empty `data:` line and no
            // message; skip them and wait for the first real JSON-RPC message.
            if payload.is_empty() {
                continue;
            }
            return serde_json::from_str(&payload).context("parse event data as JSON");
        }
    }

    anyhow::bail!("event stream ended without a JSON message")
}
