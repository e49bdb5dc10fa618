use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_UNITY_HOST: &str = "127.0.0.1";
pub const DEFAULT_UNITY_PORT: u16 = 21088;
pub const DEFAULT_SERVER_NAME: &str = "loop-mcp-stdio";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub unity: UnityConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tools: Option<ToolFilter>,
}

/// Connection settings for the Unity editor's TCP listener
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnityConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub request_timeout_secs: u64,
    pub max_frame_bytes: usize,
    pub reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
}

impl UnityConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for UnityConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_UNITY_HOST.to_string(),
            port: DEFAULT_UNITY_PORT,
            connect_timeout_ms: 3000,
            request_timeout_secs: 60,
            max_frame_bytes: 16 * 1024 * 1024,
            reconnect_attempts: 3,
            reconnect_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub instructions: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            instructions: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Include/exclude lists restricting which Unity tools are exposed to the host
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolFilter {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_defaults() {
        let unity = UnityConfig::default();
        assert_eq!(unity.addr(), "127.0.0.1:21088");
        assert_eq!(unity.connect_timeout(), Duration::from_secs(3));
        assert_eq!(unity.request_timeout(), Duration::from_secs(60));
        assert_eq!(unity.reconnect_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_unity_section_keeps_defaults() {
        let unity: UnityConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(unity.port, 9000);
        assert_eq!(unity.host, DEFAULT_UNITY_HOST);
        assert_eq!(unity.reconnect_attempts, 3);
    }
}
