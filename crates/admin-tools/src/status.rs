//! Admin API status probe.

use crate::client::AdminClient;
use crate::error::Result;
use serde_json::Value;

/// Fetch `/status` from the admin API, returning the body unmodified.
pub async fn admin_status(client: &AdminClient) -> Result<Value> {
    client.get("/status", &[]).await
}
