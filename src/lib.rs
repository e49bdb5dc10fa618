//! STDIO MCP server bridging AI hosts to the Unity editor.
//!
//! The crate root re-exports the bridge surface from [`bridge_stdio`]:
//! [`main`], [`UnityTcpClient`], [`create_server`] and [`run_server`].
//!
//! Names the bridge does not define cannot be imported from here:
//!
//! ```compile_fail
//! use loop_mcp_stdio::serve_forever;
//! ```

pub mod bridge_stdio;
pub mod config;
pub mod error;
pub mod installer;
pub mod mcp;
pub mod unity;

pub use bridge_stdio::{create_server, main, run_server, UnityTcpClient};
