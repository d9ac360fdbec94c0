//! Transport shells
//!
//! The stdio MCP transport and the HTTP transport expose the same tool
//! surface; both funnel JSON-RPC requests through [`handle_rpc`] so the
//! routing table exists exactly once.

mod http;
mod stdio;

pub use http::{AppState, create_router};
pub use stdio::run_stdio;

use serde_json::json;
use tracing::debug;

use crate::protocol::{
    InitializeResult, Info, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, ServerCapabilities,
    ToolsCallParams, ToolsCapability, ToolsListResult,
};
use crate::tools::ToolDispatcher;

/// Handle one MCP JSON-RPC request, transport-agnostic
///
/// Never fails: malformed params and unknown methods come back as JSON-RPC
/// error responses.
pub async fn handle_rpc(dispatcher: &ToolDispatcher, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.clone();
    debug!(method = %request.method, %id, "Handling request");

    match request.method.as_str() {
        "initialize" => {
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities {
                    tools: Some(ToolsCapability::default()),
                },
                server_info: Info {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            };
            match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(Some(id), -32603, e.to_string()),
            }
        }

        "tools/list" => {
            let result = ToolsListResult {
                tools: dispatcher.list().to_vec(),
            };
            match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(Some(id), -32603, e.to_string()),
            }
        }

        "tools/call" => {
            let params: ToolsCallParams =
                match serde_json::from_value(request.params.unwrap_or_default()) {
                    Ok(p) => p,
                    Err(e) => {
                        return JsonRpcResponse::error(
                            Some(id),
                            -32602,
                            format!("Invalid tools/call params: {e}"),
                        );
                    }
                };
            let result = dispatcher.invoke(&params.name, &params.arguments).await;
            match serde_json::to_value(result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::error(Some(id), -32603, e.to_string()),
            }
        }

        "ping" => JsonRpcResponse::success(id, json!({})),

        other => JsonRpcResponse::error(Some(id), -32601, format!("Method not found: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grafana::GrafanaClient;
    use crate::protocol::RequestId;
    use std::sync::Arc;

    fn dispatcher() -> ToolDispatcher {
        // Port 9 is the discard service; nothing should ever connect.
        let client = GrafanaClient::new("http://127.0.0.1:9", "test-key").unwrap();
        ToolDispatcher::new(Arc::new(client))
    }

    fn request(method: &str, params: Option<serde_json::Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: RequestId::Number(1),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_tools_capability() {
        let resp = handle_rpc(&dispatcher(), request("initialize", None)).await;
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn tools_list_enumerates_the_descriptor_table() {
        let resp = handle_rpc(&dispatcher(), request("tools/list", None)).await;
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 6);
        assert!(tools.iter().any(|t| t["name"] == "query_prometheus"));
    }

    #[tokio::test]
    async fn unknown_method_is_a_json_rpc_error() {
        let resp = handle_rpc(&dispatcher(), request("prompts/list", None)).await;
        assert_eq!(resp.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn ping_answers_with_empty_object() {
        let resp = handle_rpc(&dispatcher(), request("ping", None)).await;
        assert_eq!(resp.result.unwrap(), json!({}));
    }
}
