use super::codec::FrameConn;
use super::protocol::{
    UnityRequest, UnityResponse, METHOD_CALL_TOOL, METHOD_LIST_TOOLS, METHOD_PING,
};
use crate::config::UnityConfig;
use crate::error::{BridgeError, Result};
use crate::mcp::types::{ToolCallRequest, ToolCallResponse, ToolDefinition, ToolList};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type Connection = FrameConn<TcpStream>;

/// TCP client for the Unity editor plugin.
///
/// Cheap to clone; clones share one connection. The connection is opened lazily
/// on the first request and reopened after it drops. Requests are serialized:
/// Unity answers one request at a time on a connection.
#[derive(Clone)]
pub struct UnityTcpClient {
    config: Arc<UnityConfig>,
    conn: Arc<Mutex<Option<Connection>>>,
    next_id: Arc<AtomicU64>,
}

impl UnityTcpClient {
    pub fn new(config: UnityConfig) -> Self {
        Self {
            config: Arc::new(config),
            conn: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// `host:port` of the Unity listener
    pub fn addr(&self) -> String {
        self.config.addr()
    }

    pub fn config(&self) -> &UnityConfig {
        &self.config
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Open the connection now instead of on first request
    pub async fn connect(&self) -> Result<()> {
        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        Ok(())
    }

    /// Close the connection if one is open
    pub async fn close(&self) {
        let conn = self.conn.lock().await.take();
        if let Some(mut conn) = conn {
            if let Err(e) = conn.shutdown().await {
                debug!("Error shutting down Unity connection: {}", e);
            }
            info!("Closed Unity connection to {}", self.addr());
        }
    }

    /// Send a request and wait for the response with the matching id.
    ///
    /// The connection is taken out of the shared slot for the duration of the
    /// exchange and only put back once the stream is known to be at a frame
    /// boundary. If the caller drops this future midway, the half-used
    /// connection is dropped with it and the next request reconnects.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = UnityRequest::new(id, method, params);
        let timeout = self.config.request_timeout();

        let mut guard = self.conn.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => self.open().await?,
        };

        debug!("Unity request #{} {}", id, method);

        let outcome = tokio::time::timeout(timeout, exchange(&mut conn, &request)).await;
        match outcome {
            Ok(Ok(response)) => {
                *guard = Some(conn);
                response.into_result()
            }
            Ok(Err(err)) if keeps_connection(&err) => {
                *guard = Some(conn);
                Err(err)
            }
            Ok(Err(err)) => {
                warn!("Dropping Unity connection after error: {}", err);
                Err(err)
            }
            Err(_) => Err(BridgeError::UnityTimeout(format!(
                "'{}' got no response within {:?}",
                method, timeout
            ))),
        }
    }

    /// Round-trip a `ping`, returning the measured latency
    pub async fn ping(&self) -> Result<Duration> {
        let started = Instant::now();
        self.request(METHOD_PING, Value::Null).await?;
        Ok(started.elapsed())
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolDefinition>> {
        let value = self.request(METHOD_LIST_TOOLS, Value::Null).await?;
        let list: ToolList = decode_result(METHOD_LIST_TOOLS, value)?;
        debug!("Unity advertises {} tools", list.tools.len());
        Ok(list.tools)
    }

    pub async fn call_tool(&self, request: ToolCallRequest) -> Result<ToolCallResponse> {
        let params = serde_json::to_value(&request)?;
        let value = self.request(METHOD_CALL_TOOL, params).await?;
        decode_result(METHOD_CALL_TOOL, value)
    }

    async fn open(&self) -> Result<Connection> {
        let addr = self.addr();
        let attempts = self.config.reconnect_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.config.connect_timeout(), TcpStream::connect(&addr))
                .await
            {
                Ok(Ok(stream)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!("Failed to set TCP_NODELAY: {}", e);
                    }
                    info!("Connected to Unity editor at {}", addr);
                    return Ok(FrameConn::new(stream, self.config.max_frame_bytes));
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => {
                    last_error = format!("connect timed out after {:?}", self.config.connect_timeout())
                }
            }

            debug!(
                "Unity connect attempt {}/{} to {} failed: {}",
                attempt, attempts, addr, last_error
            );
            if attempt < attempts {
                tokio::time::sleep(self.config.reconnect_delay()).await;
            }
        }

        Err(BridgeError::UnityUnavailable(format!(
            "{} ({})",
            addr, last_error
        )))
    }
}

async fn exchange<S>(conn: &mut FrameConn<S>, request: &UnityRequest) -> Result<UnityResponse>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    conn.send(request).await?;

    loop {
        let response: UnityResponse = conn.recv().await?;
        match response.id {
            Some(id) if id == request.id => return Ok(response),
            Some(id) => warn!(
                "Skipping stale Unity response #{} while waiting for #{}",
                id, request.id
            ),
            None => debug!("Unity notification: {:?}", response.result),
        }
    }
}

/// Errors raised before anything reached the wire
fn keeps_connection(err: &BridgeError) -> bool {
    matches!(err, BridgeError::Json(_) | BridgeError::FrameTooLarge { .. })
}

fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        BridgeError::UnityProtocol(format!("unexpected '{}' result: {}", method, e))
    })
}
