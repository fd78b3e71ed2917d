//! In-memory stand-in for the Kong Admin API.
//!
//! Implements just enough of the admin surface for integration tests:
//! CRUD on services/routes/plugins with id-or-name lookup, scoped plugin
//! creation, shallow PATCH merging (one level deeper for plugin `config`),
//! and the `{data, offset}` pagination envelope.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Services,
    Routes,
    Plugins,
}

#[derive(Default)]
struct Stores {
    services: Vec<Value>,
    routes: Vec<Value>,
    plugins: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct MockAdminApi {
    stores: Arc<Mutex<Stores>>,
}

impl MockAdminApi {
    fn with_store<R>(&self, kind: Kind, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        let mut stores = self.stores.lock();
        let store = match kind {
            Kind::Services => &mut stores.services,
            Kind::Routes => &mut stores.routes,
            Kind::Plugins => &mut stores.plugins,
        };
        f(store)
    }

    fn insert(&self, kind: Kind, mut body: Value, scope: Option<(&str, String)>) -> Value {
        let id = uuid::Uuid::new_v4().to_string();
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), json!(id));
            if let Some((field, scope_id)) = scope {
                map.insert(field.to_string(), json!({ "id": scope_id }));
            }
        }
        self.with_store(kind, |store| store.push(body.clone()));
        body
    }

    fn get(&self, kind: Kind, key: &str) -> Option<Value> {
        self.with_store(kind, |store| {
            store
                .iter()
                .find(|v| v["id"] == key || v["name"] == key)
                .cloned()
        })
    }

    fn patch(&self, kind: Kind, key: &str, patch: Value) -> Option<Value> {
        self.with_store(kind, |store| {
            let record = store
                .iter_mut()
                .find(|v| v["id"] == key || v["name"] == key)?;
            merge_record(record, patch);
            Some(record.clone())
        })
    }

    fn remove(&self, kind: Kind, key: &str) -> bool {
        self.with_store(kind, |store| {
            let before = store.len();
            store.retain(|v| v["id"] != key && v["name"] != key);
            store.len() != before
        })
    }

    /// Number of stored plugins; used to assert creates really landed.
    pub fn plugin_count(&self) -> usize {
        self.with_store(Kind::Plugins, |store| store.len())
    }
}

/// Shallow merge, except plugin `config` objects merge one level deeper so
/// PATCHed config fields coexist with existing ones.
fn merge_record(record: &mut Value, patch: Value) {
    let Value::Object(patch) = patch else { return };
    let Value::Object(target) = record else { return };

    for (key, value) in patch {
        if key == "config"
            && let (Some(Value::Object(existing)), Value::Object(incoming)) =
                (target.get_mut("config"), &value)
        {
            for (ck, cv) in incoming {
                existing.insert(ck.clone(), cv.clone());
            }
            continue;
        }
        target.insert(key, value);
    }
}

fn envelope(data: Vec<Value>) -> axum::Json<Value> {
    axum::Json(json!({ "data": data, "offset": Value::Null }))
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({ "message": "Not found" })),
    )
        .into_response()
}

async fn get_status() -> axum::Json<Value> {
    axum::Json(json!({
        "database": { "reachable": true },
        "server": { "connections_accepted": 1, "total_requests": 1 }
    }))
}

async fn list_services(State(api): State<MockAdminApi>) -> axum::Json<Value> {
    envelope(api.with_store(Kind::Services, |s| s.clone()))
}

async fn create_service(
    State(api): State<MockAdminApi>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let record = api.insert(Kind::Services, body, None);
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

async fn get_service(State(api): State<MockAdminApi>, Path(id): Path<String>) -> Response {
    match api.get(Kind::Services, &id) {
        Some(record) => axum::Json(record).into_response(),
        None => not_found(),
    }
}

async fn patch_service(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    match api.patch(Kind::Services, &id, body) {
        Some(record) => axum::Json(record).into_response(),
        None => not_found(),
    }
}

async fn delete_service(State(api): State<MockAdminApi>, Path(id): Path<String>) -> Response {
    // Kong deletes are idempotent: deleting a missing id is still a 204.
    api.remove(Kind::Services, &id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_routes(State(api): State<MockAdminApi>) -> axum::Json<Value> {
    envelope(api.with_store(Kind::Routes, |s| s.clone()))
}

async fn create_route(
    State(api): State<MockAdminApi>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let record = api.insert(Kind::Routes, body, None);
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

async fn get_route(State(api): State<MockAdminApi>, Path(id): Path<String>) -> Response {
    match api.get(Kind::Routes, &id) {
        Some(record) => axum::Json(record).into_response(),
        None => not_found(),
    }
}

async fn patch_route(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    match api.patch(Kind::Routes, &id, body) {
        Some(record) => axum::Json(record).into_response(),
        None => not_found(),
    }
}

async fn delete_route(State(api): State<MockAdminApi>, Path(id): Path<String>) -> Response {
    api.remove(Kind::Routes, &id);
    StatusCode::NO_CONTENT.into_response()
}

fn filter_plugins(
    api: &MockAdminApi,
    params: &HashMap<String, String>,
    scope: Option<(&str, &str)>,
) -> Vec<Value> {
    api.with_store(Kind::Plugins, |store| {
        store
            .iter()
            .filter(|p| match scope {
                Some((field, id)) => p[field]["id"].as_str() == Some(id),
                None => true,
            })
            .filter(|p| match params.get("name") {
                Some(name) => p["name"].as_str() == Some(name.as_str()),
                None => true,
            })
            .cloned()
            .collect()
    })
}

async fn list_plugins(
    State(api): State<MockAdminApi>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::Json<Value> {
    envelope(filter_plugins(&api, &params, None))
}

async fn create_plugin(
    State(api): State<MockAdminApi>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let record = api.insert(Kind::Plugins, body, None);
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

async fn list_service_plugins(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::Json<Value> {
    envelope(filter_plugins(&api, &params, Some(("service", &id))))
}

async fn create_service_plugin(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if api.get(Kind::Services, &id).is_none() {
        return not_found();
    }
    let record = api.insert(Kind::Plugins, body, Some(("service", id)));
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

async fn list_route_plugins(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::Json<Value> {
    envelope(filter_plugins(&api, &params, Some(("route", &id))))
}

async fn create_route_plugin(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if api.get(Kind::Routes, &id).is_none() {
        return not_found();
    }
    let record = api.insert(Kind::Plugins, body, Some(("route", id)));
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

async fn list_consumer_plugins(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::Json<Value> {
    envelope(filter_plugins(&api, &params, Some(("consumer", &id))))
}

async fn create_consumer_plugin(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let record = api.insert(Kind::Plugins, body, Some(("consumer", id)));
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

async fn get_plugin(State(api): State<MockAdminApi>, Path(id): Path<String>) -> Response {
    match api.get(Kind::Plugins, &id) {
        Some(record) => axum::Json(record).into_response(),
        None => not_found(),
    }
}

async fn patch_plugin(
    State(api): State<MockAdminApi>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    match api.patch(Kind::Plugins, &id, body) {
        Some(record) => axum::Json(record).into_response(),
        None => not_found(),
    }
}

async fn delete_plugin(State(api): State<MockAdminApi>, Path(id): Path<String>) -> Response {
    api.remove(Kind::Plugins, &id);
    StatusCode::NO_CONTENT.into_response()
}

/// Bind the mock admin API on an ephemeral port.
///
/// Returns the base URL and a handle for asserting on stored state.
pub async fn spawn() -> anyhow::Result<(String, MockAdminApi)> {
    let api = MockAdminApi::default();
    let app = Router::new()
        .route("/status", get(get_status))
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{id}",
            get(get_service).patch(patch_service).delete(delete_service),
        )
        .route(
            "/services/{id}/plugins",
            get(list_service_plugins).post(create_service_plugin),
        )
        .route("/routes", get(list_routes).post(create_route))
        .route(
            "/routes/{id}",
            get(get_route).patch(patch_route).delete(delete_route),
        )
        .route(
            "/routes/{id}/plugins",
            get(list_route_plugins).post(create_route_plugin),
        )
        .route(
            "/consumers/{id}/plugins",
            get(list_consumer_plugins).post(create_consumer_plugin),
        )
        .route("/plugins", get(list_plugins).post(create_plugin))
        .route(
            "/plugins/{id}",
            get(get_plugin).patch(patch_plugin).delete(delete_plugin),
        )
        .with_state(api.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock admin api");
    });

    Ok((format!("http://{addr}"), api))
}
