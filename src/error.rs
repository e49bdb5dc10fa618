use rmcp::ErrorData as McpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unity editor unavailable: {0}")]
    UnityUnavailable(String),

    #[error("Unity connection lost: {0}")]
    UnityDisconnected(String),

    #[error("Unity request timed out: {0}")]
    UnityTimeout(String),

    #[error("Unity protocol error: {0}")]
    UnityProtocol(String),

    #[error("Request of {size} bytes exceeds the {limit} byte frame limit")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("Unity returned error {code}: {message}")]
    UnityRemote { code: i64, message: String },

    #[error("Tool not allowed: {0}")]
    ToolNotAllowed(String),

    #[error("Install source not found: {0}")]
    InstallSourceMissing(String),

    #[error("Install failed: {0}")]
    Install(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// True when the Unity editor could not be reached or the link dropped,
    /// as opposed to Unity answering with an error.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            BridgeError::UnityUnavailable(_)
                | BridgeError::UnityDisconnected(_)
                | BridgeError::UnityTimeout(_)
        )
    }

    /// Convert error to MCP error data
    pub fn to_mcp_error(&self) -> McpError {
        match self {
            BridgeError::ToolNotAllowed(_)
            | BridgeError::Json(_)
            | BridgeError::FrameTooLarge { .. } => {
                McpError::invalid_params(self.to_string(), None)
            }
            _ => McpError::internal_error(self.to_string(), None),
        }
    }
}

// Implement conversion from anyhow::Error for convenience
impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::Internal(err.to_string())
    }
}

impl From<BridgeError> for McpError {
    fn from(err: BridgeError) -> Self {
        err.to_mcp_error()
    }
}
