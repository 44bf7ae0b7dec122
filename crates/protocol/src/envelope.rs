use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::VodError;
use crate::response::ServerFault;

/// Common header of every service reply.
///
/// Action-specific fields are kept in `body` and decoded on demand, so the
/// header can be inspected before the reply's shape is known.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReply {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "codeDesc")]
    pub code_desc: Option<String>,
    #[serde(default, rename = "canRetry", deserialize_with = "flag")]
    pub can_retry: bool,
    #[serde(flatten)]
    pub body: serde_json::Map<String, serde_json::Value>,
}

impl ApiReply {
    /// Parses a raw reply body. A body without a numeric `code` is malformed.
    pub fn parse(raw: &str) -> Result<Self, VodError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// The failure view of this reply (meaningful when `code < 0`).
    pub fn fault(&self) -> ServerFault {
        ServerFault {
            code: self.code,
            message: self.message().to_string(),
            can_retry: self.can_retry,
        }
    }

    /// Fails with a server error unless `code == 0`.
    pub fn ensure_success(self) -> Result<Self, VodError> {
        if self.code != 0 {
            return Err(VodError::server(self.code, self.message()));
        }
        Ok(self)
    }

    /// Deserializes the action-specific fields into `T`.
    pub fn into_body<T: DeserializeOwned>(self) -> Result<T, VodError> {
        Ok(serde_json::from_value(serde_json::Value::Object(self.body))?)
    }
}

/// Accepts `canRetry` as `0`/`1`, a boolean, or null.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_i64() == Some(1),
        Some(serde_json::Value::String(s)) => s == "1",
        _ => false,
    })
}
