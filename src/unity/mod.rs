pub mod client;
pub mod codec;
pub mod protocol;

pub use client::UnityTcpClient;
pub use codec::encode_frame;
pub use protocol::{UnityErrorPayload, UnityRequest, UnityResponse};
