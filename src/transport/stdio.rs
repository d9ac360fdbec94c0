//! Stdio MCP transport
//!
//! Serves line-delimited JSON-RPC over the process's stdin/stdout. All
//! logging goes to stderr so stdout stays a clean protocol channel.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::handle_rpc;
use crate::Result;
use crate::protocol::{JsonRpcMessage, JsonRpcResponse};
use crate::tools::ToolDispatcher;

/// Run the stdio transport until stdin reaches EOF
pub async fn run_stdio(dispatcher: Arc<ToolDispatcher>) -> Result<()> {
    info!("Stdio MCP transport ready");
    serve(tokio::io::stdin(), tokio::io::stdout(), dispatcher).await?;
    info!("Stdin closed, stdio transport ending");
    Ok(())
}

/// Serve line-delimited JSON-RPC over any byte streams
///
/// IO failures on either stream abort the loop and surface to the caller.
async fn serve<R, W>(input: R, mut output: W, dispatcher: Arc<ToolDispatcher>) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcMessage>(&line) {
            Ok(JsonRpcMessage::Request(request)) => handle_rpc(&dispatcher, request).await,
            Ok(JsonRpcMessage::Notification(note)) => {
                debug!(method = %note.method, "Ignoring notification");
                continue;
            }
            Ok(JsonRpcMessage::Response(_)) => {
                debug!("Ignoring unsolicited response");
                continue;
            }
            Err(e) => {
                error!(error = %e, "Failed to parse message");
                JsonRpcResponse::error(None, -32700, format!("Parse error: {e}"))
            }
        };

        let mut serialized = serde_json::to_string(&response)?;
        serialized.push('\n');
        output.write_all(serialized.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::grafana::GrafanaClient;
    use serde_json::Value;

    fn dispatcher() -> Arc<ToolDispatcher> {
        // Port 9 is the discard service; nothing should ever connect.
        let client = GrafanaClient::new("http://127.0.0.1:9", "test-key").unwrap();
        Arc::new(ToolDispatcher::new(Arc::new(client)))
    }

    async fn serve_lines(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, dispatcher())
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn request_gets_one_response_line() {
        let responses = serve_lines("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn notifications_and_blank_lines_produce_no_output() {
        let input = "\n{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n   \n";
        assert!(serve_lines(input).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_line_answers_with_parse_error() {
        let responses = serve_lines("not json\n").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["id"].is_null());
    }

    #[tokio::test]
    async fn write_failure_aborts_the_loop_with_an_io_error() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";
        let output = tokio_test::io::Builder::new()
            .write_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdout closed",
            ))
            .build();

        let err = serve(input.as_bytes(), output, dispatcher())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)), "{err}");
    }
}
