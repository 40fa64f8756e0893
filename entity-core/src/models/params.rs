use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity parameter payload.
///
/// The backend sends a name → value dictionary in full mode; older endpoints
/// send pre-formatted text. Anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Text(String),
    Map(BTreeMap<String, Value>),
    Other(Value),
}

impl Params {
    /// Decode the `{"res": ...}` envelope returned by `GET /entity/{id}/param`.
    ///
    /// A bare payload without the envelope is accepted as-is.
    pub fn from_envelope(value: Value) -> Result<Option<Self>, serde_json::Error> {
        let payload = match value {
            Value::Object(mut obj) if obj.len() == 1 && obj.contains_key("res") => {
                obj.remove("res").unwrap_or(Value::Null)
            }
            other => other,
        };
        if payload.is_null() {
            return Ok(None);
        }
        serde_json::from_value(payload).map(Some)
    }
}
