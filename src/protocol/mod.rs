//! MCP protocol types
//!
//! The subset of the MCP JSON-RPC surface this gateway speaks: initialize,
//! tools/list, tools/call and ping. The same message types are served over
//! both the stdio and the HTTP transport.

mod messages;
mod types;

pub use messages::{
    InitializeResult, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RequestId, ToolsCallParams, ToolsCallResult, ToolsListResult,
};
pub use types::{Content, Info, ServerCapabilities, Tool, ToolsCapability};

/// MCP protocol version supported by this gateway
pub const PROTOCOL_VERSION: &str = "2024-11-05";
