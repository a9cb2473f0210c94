//! JSON-RPC 2.0 framing and the MCP payloads this server exchanges.
//!
//! Incoming lines are either requests (carry an `id`, expect a reply) or
//! notifications (no `id`, no reply). Outgoing lines are either a result or
//! an error object. MCP narrows JSON-RPC slightly: ids are strings or
//! integers, never `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::{ErrorClassification, ResponseEnvelope};

/// The MCP protocol revision spoken by this server.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "facebook-ads-mcp";

const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// Envelope types
// ============================================================================

/// A request id: a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Integer id.
    Number(i64),
    /// String id.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// An incoming request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol marker, always `"2.0"`.
    pub jsonrpc: String,
    /// Correlates the reply.
    pub id: RequestId,
    /// Method name, e.g. `tools/call`.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// An incoming notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol marker, always `"2.0"`.
    pub jsonrpc: String,
    /// Notification name, e.g. `notifications/initialized`.
    pub method: String,
    /// Notification parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// One parsed input line.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Expects a reply.
    Request(JsonRpcRequest),
    /// Fire-and-forget.
    Notification(JsonRpcNotification),
}

impl IncomingMessage {
    /// The method or notification name.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Request(req) => &req.method,
            Self::Notification(notif) => &notif.method,
        }
    }

    /// The request id, if this is a request.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(req) => Some(&req.id),
            Self::Notification(_) => None,
        }
    }
}

/// A successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// The id of the request being answered.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Wraps `result` as the reply to `id`.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// The standard JSON-RPC error codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The line was not valid JSON.
    ParseError,
    /// The JSON was not a valid request.
    InvalidRequest,
    /// Unknown method.
    MethodNotFound,
    /// Bad method parameters.
    InvalidParams,
    /// Failure inside the server.
    InternalError,
}

impl ErrorCode {
    /// The numeric code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// The canonical message for the code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// Numeric error code.
    pub code: i32,
    /// One-line description.
    pub message: String,
}

/// An error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// The id of the failed request, when it could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// An error reply with a custom message.
    #[must_use]
    pub fn new(id: Option<RequestId>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: JsonRpcErrorData {
                code: code.code(),
                message: message.into(),
            },
        }
    }

    /// An error reply with the code's canonical message.
    #[must_use]
    pub fn from_code(id: Option<RequestId>, code: ErrorCode) -> Self {
        Self::new(id, code, code.default_message())
    }

    /// The line could not be parsed; the id is unknown.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::from_code(None, ErrorCode::ParseError)
    }

    /// The message is not a valid request.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::from_code(id, ErrorCode::InvalidRequest)
    }

    /// The method is not implemented.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            ErrorCode::MethodNotFound,
            format!("Method not found: {method}"),
        )
    }

    /// The method parameters are malformed.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), ErrorCode::InvalidParams, message)
    }
}

/// Parses one input line.
///
/// # Errors
///
/// Returns a parse error for malformed JSON, and an invalid-request error
/// for JSON that is not a JSON-RPC 2.0 request or notification.
pub fn parse_message(line: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(line).map_err(|_| JsonRpcError::parse_error())?;
    let Some(object) = value.as_object() else {
        return Err(JsonRpcError::invalid_request(None));
    };

    if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(JsonRpcError::invalid_request(None));
    }

    if !object.contains_key("id") {
        return serde_json::from_value(value)
            .map(IncomingMessage::Notification)
            .map_err(|_| JsonRpcError::invalid_request(None));
    }

    let request: JsonRpcRequest =
        serde_json::from_value(value).map_err(|_| JsonRpcError::invalid_request(None))?;
    if request.method.is_empty() {
        return Err(JsonRpcError::invalid_request(Some(request.id)));
    }
    Ok(IncomingMessage::Request(request))
}

// ============================================================================
// MCP payloads
// ============================================================================

/// `initialize` parameters. Only the version is inspected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Revision the client asked for.
    pub protocol_version: String,
    /// Client capabilities (ignored).
    #[serde(default)]
    pub capabilities: Value,
    /// Client name and version.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Identifies the connecting client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// `initialize` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Negotiated protocol revision.
    pub protocol_version: &'static str,
    /// Server capabilities: tools only, with a static list.
    pub capabilities: Value,
    /// Server name and version.
    pub server_info: Value,
}

impl Default for InitializeResult {
    fn default() -> Self {
        Self {
            protocol_version: MCP_PROTOCOL_VERSION,
            capabilities: serde_json::json!({ "tools": {} }),
            server_info: serde_json::json!({
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }),
        }
    }
}

/// `tools/call` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Tool name.
    pub name: String,
    /// Tool arguments; may be absent.
    #[serde(default)]
    pub arguments: Value,
}

/// One content block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
}

/// `tools/call` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content blocks; this server always sends exactly one text block.
    pub content: Vec<ToolContent>,
    /// Set when the call failed.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // skip_serializing_if passes &T
const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// A successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// A failed text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// The text of the first content block.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|ToolContent::Text { text }| text.as_str())
    }
}

impl From<Result<ResponseEnvelope, ErrorClassification>> for ToolCallResult {
    fn from(outcome: Result<ResponseEnvelope, ErrorClassification>) -> Self {
        match outcome {
            Ok(envelope) => Self::text(envelope.render()),
            Err(classification) => Self::error(classification.human_message),
        }
    }
}
