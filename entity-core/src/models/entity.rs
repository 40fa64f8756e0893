use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntityId, ModelError, Params};

/// A record served by `GET /entity/{id}`.
///
/// Only `id` and `type` are always present. The backend adds `param` and
/// `data` when it renders an entity in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Display label, `type` on the wire.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<Params>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataAttachment>,
}

/// Binary data attached to an entity. Only the descriptor travels to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAttachment {
    pub id: EntityId,
    pub mimetype: Option<String>,
    pub name: String,
    #[serde(rename = "content-length", default)]
    pub content_length: Option<u64>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            unique_id: None,
            param: None,
            data: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: Params) -> Self {
        self.param = Some(param);
        self
    }

    /// Decode an entity response body.
    pub fn from_json(body: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// Decode an already-parsed response, recognising the `{"res": null}`
    /// answer the backend gives for unknown ids.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        if let Some(obj) = value.as_object() {
            if obj.len() == 1 && obj.get("res").is_some_and(Value::is_null) {
                return Err(ModelError::Missing);
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}
