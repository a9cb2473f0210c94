//! Model Context Protocol server.
//!
//! The server speaks JSON-RPC 2.0 over stdio, one message per line, and
//! exposes the ads management tools from [`crate::tools`].
//!
//! ```text
//!   stdin ──▶ transport ──▶ server (lifecycle) ──▶ tools::Dispatcher ──▶ AdsApi
//!   stdout ◀──────────────────┘
//! ```
//!
//! Protocol revision: 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::StdioTransport;
