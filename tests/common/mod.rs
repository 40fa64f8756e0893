//! In-process mock of the entity backend.
//!
//! Mirrors the backend's wire behaviour: unknown ids answer 200 with
//! `{"res": null}`, parameters come wrapped in `{"res": ...}`, and `POST /`
//! echoes the submitted `textfield`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Clone, Default)]
pub struct Backend {
    entities: Arc<Mutex<HashMap<String, Value>>>,
    delays: Arc<Mutex<HashMap<String, u64>>>,
    raw_bodies: Arc<Mutex<HashMap<String, String>>>,
    plain_deletes: Arc<Mutex<HashMap<String, String>>>,
    api_key: Option<String>,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn insert(&self, entity: Value) -> &Self {
        let id = match &entity["id"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.entities.lock().insert(id, entity);
        self
    }

    /// Delay every response for `id` by `ms` milliseconds.
    pub fn delay(&self, id: &str, ms: u64) -> &Self {
        self.delays.lock().insert(id.to_string(), ms);
        self
    }

    /// Answer `GET /entity/{id}` with a fixed 200 body.
    pub fn raw_body(&self, id: &str, body: &str) -> &Self {
        self.raw_bodies.lock().insert(id.to_string(), body.to_string());
        self
    }

    /// Answer `DELETE /entity/{id}` with a fixed text/plain body.
    pub fn plain_delete(&self, id: &str, body: &str) -> &Self {
        self.plain_deletes
            .lock()
            .insert(id.to_string(), body.to_string());
        self
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.entities.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.lock().contains_key(id)
    }

    async fn pause(&self, id: &str) {
        let delay = self.delays.lock().get(id).copied();
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.api_key {
            None => true,
            Some(key) => headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == format!("Bearer {}", key)),
        }
    }
}

async fn get_entity(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    backend.pause(&id).await;
    if id == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database exploded").into_response();
    }
    let raw = backend.raw_bodies.lock().get(&id).cloned();
    if let Some(body) = raw {
        return (StatusCode::OK, body).into_response();
    }
    let entity = backend.entities.lock().get(&id).cloned();
    Json(entity.unwrap_or_else(|| json!({ "res": null }))).into_response()
}

async fn get_params(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    backend.pause(&id).await;
    let param = backend
        .entities
        .lock()
        .get(&id)
        .map(|e| e.get("param").cloned().unwrap_or(Value::Null));
    match param {
        Some(param) => Json(json!({ "res": param })).into_response(),
        None => (StatusCode::NOT_FOUND, "no such entity").into_response(),
    }
}

async fn delete_entity(State(backend): State<Backend>, Path(id): Path<String>) -> Response {
    backend.pause(&id).await;
    let plain = backend.plain_deletes.lock().get(&id).cloned();
    if let Some(body) = plain {
        backend.entities.lock().remove(&id);
        return (StatusCode::OK, body).into_response();
    }
    match backend.entities.lock().remove(&id) {
        Some(_) => Json(json!({ "deleted": "ok" })).into_response(),
        None => Json(json!({ "res": null })).into_response(),
    }
}

async fn put_entity(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    Json(mut entity): Json<Value>,
) -> Response {
    entity["id"] = Value::String(id.clone());
    backend.entities.lock().insert(id.clone(), entity);
    Json(json!({ "res": format!("PUT{}", id) })).into_response()
}

#[derive(Deserialize)]
struct TextForm {
    textfield: String,
}

async fn submit(Form(form): Form<TextForm>) -> Response {
    form.textfield.into_response()
}

pub fn router(backend: Backend) -> Router {
    Router::new()
        .route("/", post(submit))
        .route(
            "/entity/{id}",
            get(get_entity).put(put_entity).delete(delete_entity),
        )
        .route("/entity/{id}/param", get(get_params))
        .with_state(backend)
}

/// Serve the backend on an ephemeral port and return its base URL.
pub async fn spawn(backend: Backend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router(backend))
            .await
            .expect("Mock backend failed");
    });
    format!("http://{}", addr)
}

/// The entity used across specs.
pub fn widget() -> Value {
    json!({ "id": 42, "type": "widget", "param": "x" })
}
