//! Length-prefixed JSON framing for the Unity TCP link.
//!
//! A frame is a 4-byte big-endian payload length followed by the payload.

use crate::error::{BridgeError, Result};
use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Framed connection over any byte stream (a `TcpStream` in production)
#[derive(Debug)]
pub(crate) struct FrameConn<S> {
    stream: S,
    max_frame_bytes: usize,
}

impl<S> FrameConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: S, max_frame_bytes: usize) -> Self {
        Self {
            stream,
            max_frame_bytes,
        }
    }

    pub(crate) async fn send<T: Serialize>(&mut self, msg: &T) -> Result<()> {
        let payload = serde_json::to_vec(msg)?;
        // Rejected before any byte is written, so the stream stays usable
        if payload.len() > self.max_frame_bytes {
            return Err(BridgeError::FrameTooLarge {
                size: payload.len(),
                limit: self.max_frame_bytes,
            });
        }

        let buf = frame_payload(&payload);
        self.stream
            .write_all(&buf)
            .await
            .map_err(|e| BridgeError::UnityDisconnected(format!("write failed: {}", e)))?;
        self.stream
            .flush()
            .await
            .map_err(|e| BridgeError::UnityDisconnected(format!("flush failed: {}", e)))?;
        Ok(())
    }

    pub(crate) async fn recv<T: DeserializeOwned>(&mut self) -> Result<T> {
        let mut len_buf = [0u8; 4];
        self.stream
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| BridgeError::UnityDisconnected(format!("read length failed: {}", e)))?;

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > self.max_frame_bytes {
            return Err(BridgeError::UnityProtocol(format!(
                "incoming frame of {} bytes exceeds limit of {}",
                len, self.max_frame_bytes
            )));
        }

        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .await
            .map_err(|e| BridgeError::UnityDisconnected(format!("read payload failed: {}", e)))?;

        serde_json::from_slice(&payload)
            .map_err(|e| BridgeError::UnityProtocol(format!("malformed frame: {}", e)))
    }

    pub(crate) async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

/// Encode a message into a complete frame
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(msg)?;
    Ok(frame_payload(&payload).to_vec())
}

fn frame_payload(payload: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(4 + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(payload);
    buf
}
