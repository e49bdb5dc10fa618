// MCP server that forwards tool discovery and tool calls to the Unity editor.
// The host talks MCP over stdio; every request becomes one Unity TCP request.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use std::sync::Arc;
use tracing::{debug, warn};

use super::tool_filter::{ensure_callable, filter_catalog};
use super::types::{ToolCallRequest, ToolCallResponse, ToolContent, ToolDefinition};
use crate::config::ToolFilter;
use crate::error::BridgeError;
use crate::unity::UnityTcpClient;

/// MCP handler backed by a [`UnityTcpClient`]
#[derive(Clone)]
pub struct UnityBridgeServer {
    client: UnityTcpClient,
    server_name: String,
    instructions: Option<String>,
    tool_filter: Option<Arc<ToolFilter>>,
}

impl UnityBridgeServer {
    pub fn new(client: UnityTcpClient, server_name: String) -> Self {
        Self {
            client,
            server_name,
            instructions: None,
            tool_filter: None,
        }
    }

    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_tool_filter(mut self, filter: Option<ToolFilter>) -> Self {
        self.tool_filter = filter.map(Arc::new);
        self
    }

    pub fn client(&self) -> &UnityTcpClient {
        &self.client
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Tools Unity advertises, after the configured filter
    pub async fn visible_tools(&self) -> Result<Vec<ToolDefinition>, BridgeError> {
        let tools = self.client.list_tools().await?;
        Ok(filter_catalog(tools, self.tool_filter.as_deref()))
    }

    /// Forward a tool call, turning connection failures into an error result
    /// the host model can read instead of a protocol failure
    pub async fn forward_call(
        &self,
        request: ToolCallRequest,
    ) -> Result<ToolCallResponse, BridgeError> {
        ensure_callable(&request.name, self.tool_filter.as_deref())?;

        match self.client.call_tool(request).await {
            Ok(response) => Ok(response),
            Err(e @ BridgeError::UnityRemote { .. }) => Ok(error_response(e.to_string())),
            Err(e) if e.is_connection_failure() => {
                warn!("Unity tool call failed: {}", e);
                Ok(error_response(format!(
                    "{}. Make sure the Unity editor is open and the Loop MCP plugin is listening on {}.",
                    e,
                    self.client.addr()
                )))
            }
            Err(e) => Err(e),
        }
    }
}

fn error_response(text: String) -> ToolCallResponse {
    ToolCallResponse {
        content: vec![ToolContent::Text { text }],
        is_error: Some(true),
    }
}

fn to_mcp_tool(tool: ToolDefinition) -> rmcp::model::Tool {
    rmcp::model::Tool {
        name: tool.name.into(),
        title: None,
        description: tool.description.map(Into::into),
        input_schema: Arc::new(tool.input_schema.as_object().cloned().unwrap_or_default()),
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

fn to_mcp_content(content: ToolContent) -> Content {
    match content {
        ToolContent::Text { text } => Content::text(text),
        ToolContent::Image { data, mime_type } => Content::image(data, mime_type),
        ToolContent::Resource { uri, mime_type } => Content::text(format!(
            "Resource: {} ({})",
            uri,
            mime_type.unwrap_or_else(|| "unknown".to_string())
        )),
    }
}

impl ServerHandler for UnityBridgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions.clone().unwrap_or_else(|| {
                format!(
                    "Tools of the Unity editor reachable at {}",
                    self.client.addr()
                )
            })),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.server_name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        debug!("Bridge server listing tools");
        let tools = self.visible_tools().await.map_err(|e| {
            McpError::internal_error(format!("Failed to list Unity tools: {}", e), None)
        })?;

        Ok(ListToolsResult {
            meta: None,
            tools: tools.into_iter().map(to_mcp_tool).collect(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Bridge server calling tool: {}", params.name);

        let request = ToolCallRequest {
            name: params.name.to_string(),
            arguments: serde_json::Value::Object(params.arguments.unwrap_or_default()),
        };

        let response = self.forward_call(request).await?;

        Ok(CallToolResult {
            meta: None,
            content: response.content.into_iter().map(to_mcp_content).collect(),
            structured_content: None,
            is_error: response.is_error,
        })
    }
}
