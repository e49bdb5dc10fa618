#![allow(dead_code)]

use loop_mcp_stdio::config::{BridgeConfig, UnityConfig};
use loop_mcp_stdio::unity::{encode_frame, UnityRequest};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ──────────────────────────────────────────────
// Mock Unity editor
// ──────────────────────────────────────────────

/// What the mock editor does with one request
pub enum Reply {
    /// Write these frames back, in order
    Frames(Vec<Value>),
    /// Close the connection without answering
    Hangup,
    /// Never answer
    Silence,
}

pub type Handler = Arc<dyn Fn(&UnityRequest) -> Reply + Send + Sync>;

pub struct MockUnity {
    pub addr: SocketAddr,
    pub connections: Arc<AtomicUsize>,
    pub requests: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockUnity {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for MockUnity {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start a mock editor on an ephemeral port answering with `handler`
pub async fn spawn_mock_unity(handler: Handler) -> MockUnity {
    spawn_sluggish_unity(handler, Duration::ZERO).await
}

/// Like [`spawn_mock_unity`], but each accepted connection sits unread for
/// `read_delay` first, the way a busy editor main thread does
pub async fn spawn_sluggish_unity(handler: Handler, read_delay: Duration) -> MockUnity {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(AtomicUsize::new(0));

    let task = {
        let connections = Arc::clone(&connections);
        let requests = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                connections.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve_connection(
                    stream,
                    Arc::clone(&handler),
                    Arc::clone(&requests),
                    read_delay,
                ));
            }
        })
    };

    MockUnity {
        addr,
        connections,
        requests,
        task,
    }
}

/// Mock editor with the standard tool set
pub async fn spawn_default_unity() -> MockUnity {
    spawn_mock_unity(Arc::new(default_reply)).await
}

async fn serve_connection(
    mut stream: TcpStream,
    handler: Handler,
    requests: Arc<AtomicUsize>,
    read_delay: Duration,
) {
    if !read_delay.is_zero() {
        tokio::time::sleep(read_delay).await;
    }
    loop {
        let mut len_buf = [0u8; 4];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut payload = vec![0u8; u32::from_be_bytes(len_buf) as usize];
        if stream.read_exact(&mut payload).await.is_err() {
            return;
        }
        let request: UnityRequest = serde_json::from_slice(&payload).unwrap();
        requests.fetch_add(1, Ordering::SeqCst);

        match handler(&request) {
            Reply::Frames(frames) => {
                for frame in frames {
                    let bytes = encode_frame(&frame).unwrap();
                    if stream.write_all(&bytes).await.is_err() {
                        return;
                    }
                }
            }
            Reply::Hangup => return,
            Reply::Silence => {}
        }
    }
}

/// Tools: `get_scene`, `find_object`, `delete_asset`
pub fn default_reply(request: &UnityRequest) -> Reply {
    let result = match request.method.as_str() {
        "ping" => json!("pong"),
        "tools/list" => json!({
            "tools": [
                {
                    "name": "get_scene",
                    "description": "Describe the active scene",
                    "inputSchema": {"type": "object", "properties": {}}
                },
                {
                    "name": "find_object",
                    "description": "Find a GameObject by name",
                    "inputSchema": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                },
                {
                    "name": "delete_asset",
                    "inputSchema": {"type": "object"}
                }
            ]
        }),
        "tools/call" => {
            let name = request.params["name"].as_str().unwrap_or_default();
            match name {
                "get_scene" => json!({
                    "content": [{"type": "text", "text": "Scene 'Main' with 3 root objects"}],
                    "isError": false
                }),
                "find_object" => json!({
                    "content": [{
                        "type": "text",
                        "text": format!("Found {}", request.params["arguments"]["name"].as_str().unwrap_or("?"))
                    }]
                }),
                other => {
                    return Reply::Frames(vec![json!({
                        "id": request.id,
                        "error": {"code": -32602, "message": format!("unknown tool {}", other)}
                    })]);
                }
            }
        }
        other => {
            return Reply::Frames(vec![json!({
                "id": request.id,
                "error": {"code": -32601, "message": format!("unknown method {}", other)}
            })]);
        }
    };

    Reply::Frames(vec![json!({"id": request.id, "result": result})])
}

// ──────────────────────────────────────────────
// Shared helpers
// ──────────────────────────────────────────────

/// Unity settings pointing at `port`, tuned for fast tests
pub fn unity_config(port: u16) -> UnityConfig {
    UnityConfig {
        port,
        connect_timeout_ms: 500,
        request_timeout_secs: 2,
        reconnect_attempts: 2,
        reconnect_delay_ms: 20,
        ..Default::default()
    }
}

pub fn bridge_config(port: u16) -> BridgeConfig {
    BridgeConfig {
        unity: unity_config(port),
        ..Default::default()
    }
}

/// A port nothing listens on
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
