//! Tool failure taxonomy and the error classifier.
//!
//! Every stage of a tool call returns [`ToolError`]. The dispatcher turns the
//! final error into an [`ErrorClassification`], which is what reaches the
//! caller as an `isError: true` content block.

use serde::Serialize;
use thiserror::Error;

use crate::graph::{ApiErrorPayload, GraphError};

/// Result type for tool stages.
pub type ToolResult<T> = Result<T, ToolError>;

/// A failed tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Caller-supplied arguments were insufficient or conflicting.
    #[error("{0}")]
    Validation(String),

    /// Unknown tool, or the platform reported a missing object.
    #[error("{0}")]
    NotFound(String),

    /// The platform rejected the request.
    #[error("Facebook API Error ({tool}): {}", describe_payload(.payload))]
    VendorApi {
        /// Tool being executed.
        tool: String,
        /// The platform's error object.
        payload: ApiErrorPayload,
    },

    /// Anything else: transport failures, malformed responses, local I/O.
    #[error("Error ({tool}): {message}")]
    Internal {
        /// Tool being executed.
        tool: String,
        /// Description of the failure.
        message: String,
    },
}

/// Renders `<message> (Code: <code>, Subcode: <subcode>, Trace ID: <trace>)`.
fn describe_payload(payload: &ApiErrorPayload) -> String {
    let message = if payload.message.is_empty() {
        "Unknown API error"
    } else {
        payload.message.as_str()
    };
    format!(
        "{message} (Code: {}, Subcode: {}, Trace ID: {})",
        or_na(payload.code.as_ref()),
        or_na(payload.error_subcode.as_ref()),
        or_na(payload.fbtrace_id.as_ref())
    )
}

fn or_na<T: ToString>(value: Option<&T>) -> String {
    value.map_or_else(|| "n/a".to_string(), ToString::to_string)
}

impl ToolError {
    /// Builds a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds an internal error attributed to `tool`.
    pub fn internal(tool: &str, message: impl Into<String>) -> Self {
        Self::Internal {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Classifies a failure raised by the Graph API layer.
    #[must_use]
    pub fn from_graph(tool: &str, error: GraphError) -> Self {
        match error {
            GraphError::Api { payload, .. } => Self::VendorApi {
                tool: tool.to_string(),
                payload,
            },
            GraphError::NotFound { path } => {
                Self::NotFound(format!("Not found ({tool}): object '{path}' does not exist"))
            }
            other => Self::internal(tool, other.to_string()),
        }
    }

    /// The category of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFoundError,
            Self::VendorApi { .. } => ErrorKind::VendorApiError,
            Self::Internal { .. } => ErrorKind::InternalError,
        }
    }

    /// Produces the caller-facing classification. Never fails.
    #[must_use]
    pub fn classify(&self) -> ErrorClassification {
        ErrorClassification {
            kind: self.kind(),
            human_message: self.to_string(),
            is_error: true,
        }
    }
}

/// Failure categories reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The platform rejected the request.
    VendorApiError,
    /// Arguments were insufficient or conflicting.
    ValidationError,
    /// Unknown tool or missing object.
    NotFoundError,
    /// Anything else.
    InternalError,
}

/// The terminal error artifact of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorClassification {
    /// Failure category.
    pub kind: ErrorKind,
    /// One-line message shown to the caller.
    pub human_message: String,
    /// Always `true`.
    pub is_error: bool,
}
