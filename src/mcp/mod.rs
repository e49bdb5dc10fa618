pub mod bridge;
pub(crate) mod tool_filter;
pub mod types;

pub use bridge::UnityBridgeServer;
pub use types::{ToolCallRequest, ToolCallResponse, ToolContent, ToolDefinition};
