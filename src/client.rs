//! HTTP client for the entity backend.
//!
//! Every call goes through [`EntityClient::send`], which takes the HTTP verb
//! as a value so GET, POST, PUT and DELETE share one call shape.
//! Configuration comes from [`ClientConfig`](crate::config::ClientConfig).

use std::time::Duration;

use entity_core::{Entity, EntityId, ModelError, Params};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid entity id: {0:?}")]
    InvalidId(String),
}

/// HTTP verbs the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

/// Result of a successful `DELETE /entity/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The backend had no entity with that id.
    Missing,
}

/// Request payload for [`EntityClient::send`].
#[derive(Debug, Clone, Copy)]
pub enum Body<'a> {
    Empty,
    Json(&'a Value),
    Form(&'a [(&'a str, &'a str)]),
}

/// HTTP client for the `/entity` API.
#[derive(Debug, Clone)]
pub struct EntityClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl EntityClient {
    /// Create a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Create with explicit base URL and default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let config = ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        };
        Self::from_config(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request with any verb.
    pub async fn send(
        &self,
        verb: Verb,
        path: &str,
        body: Body<'_>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{:?} {}", verb, url);

        let mut req = self.client.request(verb.method(), &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req = match body {
            Body::Empty => req,
            Body::Json(value) => req.json(value),
            Body::Form(fields) => req.form(fields),
        };
        Ok(req.send().await?)
    }

    /// Check status, converting HTTP errors to ClientError.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }

    /// Read a successful JSON body. Empty bodies decode as `null`.
    async fn json_body(response: reqwest::Response) -> Result<Value, ClientError> {
        let text = Self::check_status(response).await?.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn entity_path(id: &EntityId) -> Result<String, ClientError> {
        if !id.is_path_safe() {
            return Err(ClientError::InvalidId(id.to_string()));
        }
        Ok(format!("/entity/{}", id))
    }

    // ============================================================
    // Entity Operations
    // ============================================================

    /// Get an entity by ID.
    pub async fn get_entity(&self, id: &EntityId) -> Result<Entity, ClientError> {
        let path = Self::entity_path(id)?;
        let response = self.send(Verb::Get, &path, Body::Empty).await?;
        let value = Self::json_body(response).await?;
        Entity::from_value(value).map_err(|e| match e {
            ModelError::Missing => ClientError::NotFound(format!("entity {}", id)),
            ModelError::Json(e) => ClientError::Decode(e.to_string()),
        })
    }

    /// Get the parameter payload of an entity.
    pub async fn get_params(&self, id: &EntityId) -> Result<Option<Params>, ClientError> {
        let path = format!("{}/param", Self::entity_path(id)?);
        let response = self.send(Verb::Get, &path, Body::Empty).await?;
        let value = Self::json_body(response).await?;
        Params::from_envelope(value).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Delete an entity.
    ///
    /// Any 2xx counts as deleted; the body only matters when it is the
    /// backend's `{"res": null}` answer for an unknown id.
    pub async fn delete_entity(&self, id: &EntityId) -> Result<DeleteOutcome, ClientError> {
        let path = Self::entity_path(id)?;
        let response = self.send(Verb::Delete, &path, Body::Empty).await?;
        let text = Self::check_status(response).await?.text().await?;

        let missing = serde_json::from_str::<Value>(&text).is_ok_and(|value| {
            value
                .as_object()
                .is_some_and(|obj| obj.get("res").is_some_and(Value::is_null))
        });
        Ok(if missing {
            DeleteOutcome::Missing
        } else {
            DeleteOutcome::Deleted
        })
    }

    // ============================================================
    // Legacy Form Post
    // ============================================================

    /// Post free text to `/` and return the HTML the backend answers with.
    pub async fn submit_text(&self, text: &str) -> Result<String, ClientError> {
        let fields = [("textfield", text)];
        let response = self.send(Verb::Post, "/", Body::Form(&fields)).await?;
        Ok(Self::check_status(response).await?.text().await?)
    }
}
