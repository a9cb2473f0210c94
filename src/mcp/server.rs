//! MCP server lifecycle.
//!
//! The server moves through three phases:
//!
//! 1. `initialize` request, answered with the protocol revision and tool capability
//! 2. `notifications/initialized`, after which tools may be listed and called
//! 3. shutdown on end of input or a termination signal
//!
//! Tool calls are handed to the [`Dispatcher`]; every outcome, including a
//! failed tool call, is a successful JSON-RPC reply whose result carries the
//! text and `isError` flag. JSON-RPC errors are reserved for protocol faults.

use serde::Serialize;
use serde_json::{json, Value};

use crate::graph::AdsApi;
use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId, ToolCallParams,
    ToolCallResult, MCP_PROTOCOL_VERSION,
};
use crate::mcp::transport::StdioTransport;
use crate::tools::Dispatcher;

/// Where the server is in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No `initialize` yet.
    AwaitingInit,
    /// `initialize` answered, waiting for `notifications/initialized`.
    Initialising,
    /// Serving tool requests.
    Running,
    /// Input closed or a signal arrived.
    ShuttingDown,
}

/// One outgoing line.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// A result.
    Success(JsonRpcResponse),
    /// A protocol error.
    Failure(JsonRpcError),
}

impl From<Result<JsonRpcResponse, JsonRpcError>> for Reply {
    fn from(outcome: Result<JsonRpcResponse, JsonRpcError>) -> Self {
        match outcome {
            Ok(response) => Self::Success(response),
            Err(error) => Self::Failure(error),
        }
    }
}

/// Serves the ads tools over stdio.
pub struct McpServer<A> {
    state: ServerState,
    transport: StdioTransport,
    protocol_version: Option<String>,
    dispatcher: Dispatcher<A>,
}

impl<A: AdsApi> McpServer<A> {
    /// Creates a server that routes tool calls to `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Dispatcher<A>) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport: StdioTransport::new(),
            protocol_version: None,
            dispatcher,
        }
    }

    /// The current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// The protocol revision agreed at `initialize`.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Serves requests until stdin closes or the process is asked to stop.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        while self.state != ServerState::ShuttingDown {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, shutting down");
                    self.state = ServerState::ShuttingDown;
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, shutting down");
                    self.state = ServerState::ShuttingDown;
                }
                line = self.transport.read_line() => self.serve_line(line?).await?,
            }
        }
        Ok(())
    }

    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while self.state != ServerState::ShuttingDown {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, shutting down");
                    self.state = ServerState::ShuttingDown;
                }
                line = self.transport.read_line() => self.serve_line(line?).await?,
            }
        }
        Ok(())
    }

    async fn serve_line(&mut self, line: Option<String>) -> std::io::Result<()> {
        let Some(line) = line else {
            tracing::info!("Input closed");
            self.state = ServerState::ShuttingDown;
            return Ok(());
        };

        if let Some(reply) = self.handle_line(&line).await {
            self.transport.write_message(&reply).await?;
        }
        Ok(())
    }

    /// Handles one input line, returning the reply to send, if any.
    ///
    /// Blank lines and notifications produce no reply.
    pub async fn handle_line(&mut self, line: &str) -> Option<Reply> {
        if line.trim().is_empty() {
            return None;
        }

        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => Some(self.handle_request(req).await.into()),
            Ok(IncomingMessage::Notification(notif)) => {
                self.handle_notification(&notif);
                None
            }
            Err(error) => {
                tracing::warn!(code = error.error.code, "Rejected input line");
                Some(Reply::Failure(error))
            }
        }
    }

    async fn handle_request(&mut self, req: JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        tracing::debug!(id = %req.id, method = %req.method, "Request");
        match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(req).await,
            "ping" => Ok(JsonRpcResponse::success(req.id, json!({}))),
            _ => Err(JsonRpcError::method_not_found(req.id, &req.method)),
        }
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                tracing::info!("Client ready");
                self.state = ServerState::Running;
            }
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                ErrorCode::InvalidRequest,
                "Server already initialised",
            ));
        }

        let params: InitializeParams = parse_params(req, "initialize")?;
        if params.protocol_version != MCP_PROTOCOL_VERSION {
            tracing::info!(
                requested = %params.protocol_version,
                offered = MCP_PROTOCOL_VERSION,
                "Client requested a different protocol revision"
            );
        }
        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = ?client.version, "Client connected");
        }

        self.protocol_version = Some(MCP_PROTOCOL_VERSION.to_string());
        self.state = ServerState::Initialising;

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            to_result(&req.id, &InitializeResult::default())?,
        ))
    }

    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        let tools = self.dispatcher.definitions();
        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "tools": to_result(&req.id, &tools)? }),
        ))
    }

    async fn handle_tools_call(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        let params: ToolCallParams = parse_params(&req, "tool call")?;

        let result: ToolCallResult = self
            .dispatcher
            .dispatch(&params.name, params.arguments)
            .await
            .into();
        Ok(JsonRpcResponse::success(
            req.id.clone(),
            to_result(&req.id, &result)?,
        ))
    }

    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state == ServerState::Running {
            Ok(())
        } else {
            Err(JsonRpcError::new(
                Some(id.clone()),
                ErrorCode::InvalidRequest,
                "Server not initialised",
            ))
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    req: &JsonRpcRequest,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = req.params.clone().ok_or_else(|| {
        JsonRpcError::invalid_params(req.id.clone(), format!("Missing {what} params"))
    })?;
    serde_json::from_value(params).map_err(|e| {
        JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}"))
    })
}

fn to_result<T: Serialize>(id: &RequestId, value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| {
        JsonRpcError::new(Some(id.clone()), ErrorCode::InternalError, e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MockAdsApi, RecordedCall};

    fn server(mock: &MockAdsApi) -> McpServer<MockAdsApi> {
        McpServer::new(Dispatcher::new(mock.clone(), "123"))
    }

    async fn reply(server: &mut McpServer<MockAdsApi>, line: &str) -> Value {
        let reply = server.handle_line(line).await.expect("reply expected");
        serde_json::to_value(reply).unwrap()
    }

    async fn initialise(server: &mut McpServer<MockAdsApi>) {
        let init = reply(
            server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test"}}}"#,
        )
        .await;
        assert_eq!(init["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(server.protocol_version(), Some(MCP_PROTOCOL_VERSION));
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert_eq!(server.state(), ServerState::Running);
    }

    #[tokio::test]
    async fn tools_require_initialisation() {
        let mock = MockAdsApi::new();
        let mut server = server(&mock);
        assert_eq!(server.protocol_version(), None);
        let value = reply(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;
        assert_eq!(value["error"]["code"], ErrorCode::InvalidRequest.code());
        assert_eq!(value["error"]["message"], "Server not initialised");
    }

    #[tokio::test]
    async fn second_initialize_is_rejected() {
        let mock = MockAdsApi::new();
        let mut server = server(&mock);
        initialise(&mut server).await;
        let value = reply(
            &mut server,
            r#"{"jsonrpc":"2.0","id":2,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        )
        .await;
        assert_eq!(value["error"]["message"], "Server already initialised");
    }

    #[tokio::test]
    async fn lists_every_tool() {
        let mock = MockAdsApi::new();
        let mut server = server(&mock);
        initialise(&mut server).await;
        let value = reply(&mut server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = value["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), crate::tools::Tool::ALL.len());
        assert!(tools
            .iter()
            .all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn tool_failures_are_results_not_protocol_errors() {
        let mock = MockAdsApi::new();
        let mut server = server(&mock);
        initialise(&mut server).await;

        let value = reply(
            &mut server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"create_campaign","arguments":{"name":"x"}}}"#,
        )
        .await;
        assert!(value.get("error").is_none());
        assert_eq!(value["result"]["isError"], true);
        assert_eq!(
            value["result"]["content"][0]["text"],
            "Missing required field(s) for create_campaign: objective"
        );
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn successful_call_renders_the_envelope() {
        let mock = MockAdsApi::new();
        let mut server = server(&mock);
        initialise(&mut server).await;

        let value = reply(
            &mut server,
            r#"{"jsonrpc":"2.0","id":"c","method":"tools/call","params":{"name":"delete_ad","arguments":{"adId":"42"}}}"#,
        )
        .await;
        assert_eq!(value["id"], "c");
        let text = value["result"]["content"][0]["text"].as_str().unwrap();
        let envelope: Value = serde_json::from_str(text).unwrap();
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["data"], json!({"id": "42", "deleted": true}));
        assert_eq!(mock.calls(), vec![RecordedCall::Delete { id: "42".to_string() }]);
    }

    #[tokio::test]
    async fn protocol_faults() {
        let mock = MockAdsApi::new();
        let mut server = server(&mock);
        assert!(server.handle_line("   ").await.is_none());

        let value = reply(&mut server, "not json").await;
        assert_eq!(value["error"]["code"], ErrorCode::ParseError.code());

        let value = reply(&mut server, r#"{"jsonrpc":"2.0","id":9,"method":"resources/list"}"#).await;
        assert_eq!(value["error"]["code"], ErrorCode::MethodNotFound.code());

        let value = reply(&mut server, r#"{"jsonrpc":"2.0","id":10,"method":"ping"}"#).await;
        assert_eq!(value["result"], json!({}));
    }
}
