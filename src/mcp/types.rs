use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool the Unity editor advertises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "empty_schema")]
    pub input_schema: Value,
}

fn empty_schema() -> Value {
    serde_json::json!({ "type": "object" })
}

/// Request to call a Unity tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Response from a Unity tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResponse {
    #[serde(default)]
    pub content: Vec<ToolContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        uri: String,
        #[serde(default, rename = "mimeType")]
        mime_type: Option<String>,
    },
}

/// Wrapper for the `tools/list` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ToolList {
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_defaults_schema() {
        let tool: ToolDefinition = serde_json::from_value(json!({"name": "get_scene"})).unwrap();
        assert_eq!(tool.input_schema, json!({"type": "object"}));
        assert!(tool.description.is_none());
    }

    #[test]
    fn test_call_response_from_unity() {
        let response: ToolCallResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "3 objects"},
                {"type": "image", "data": "iVBOR", "mimeType": "image/png"},
                {"type": "resource", "uri": "unity://scene/Main"}
            ],
            "isError": false
        }))
        .unwrap();

        assert_eq!(response.content.len(), 3);
        assert_eq!(response.is_error, Some(false));
        assert_eq!(
            response.content[1],
            ToolContent::Image {
                data: "iVBOR".to_string(),
                mime_type: "image/png".to_string()
            }
        );
        assert_eq!(
            response.content[2],
            ToolContent::Resource {
                uri: "unity://scene/Main".to_string(),
                mime_type: None
            }
        );
    }
}
