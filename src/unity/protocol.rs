//! Messages exchanged with the Unity editor plugin.
//!
//! Every message is one JSON object carried in a single frame (see [`super::codec`]).
//! Requests always carry an `id`; responses echo it back. Frames from Unity
//! without an `id` are notifications (log lines, compile events) and are not
//! answers to anything.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const METHOD_PING: &str = "ping";
pub const METHOD_LIST_TOOLS: &str = "tools/list";
pub const METHOD_CALL_TOOL: &str = "tools/call";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnityRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl UnityRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnityResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<UnityErrorPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnityErrorPayload {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

impl UnityResponse {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Resolve into the result value, surfacing a Unity-side error.
    /// A response carrying neither result nor error resolves to `null`.
    pub fn into_result(self) -> Result<Value, BridgeError> {
        match (self.error, self.result) {
            (Some(err), _) => Err(BridgeError::UnityRemote {
                code: err.code,
                message: err.message,
            }),
            (None, Some(result)) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}
