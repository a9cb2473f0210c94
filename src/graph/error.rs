//! Error types for Graph API calls.

use serde::Deserialize;
use thiserror::Error;

/// Result type for Graph API operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// The `error` object the Graph API embeds in failed responses.
///
/// ```json
/// {"error": {"message": "Invalid parameter", "type": "OAuthException",
///            "code": 100, "error_subcode": 33, "fbtrace_id": "AbC"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorPayload {
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Exception class, e.g. `OAuthException`.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Top-level error code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Refining subcode.
    #[serde(default)]
    pub error_subcode: Option<i64>,
    /// Trace id for Facebook support.
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

/// Wrapper matching the body of a failed Graph API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: ApiErrorPayload,
}

/// Errors that can occur while talking to the Graph API.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The platform rejected the request and said why.
    #[error("{}", .payload.message)]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// The embedded error object.
        payload: ApiErrorPayload,
    },

    /// The addressed node does not exist and no error payload was returned.
    #[error("object not found: {path}")]
    NotFound {
        /// Request path that was not found.
        path: String,
    },

    /// Non-success status without a recognisable error payload.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Connection, TLS or protocol failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON that was expected.
    #[error("invalid response from Graph API: {message}")]
    Decode {
        /// Description of what could not be decoded.
        message: String,
    },
}

impl GraphError {
    /// Convenience constructor for a platform error, mainly for tests.
    #[must_use]
    pub fn api(status: u16, payload: ApiErrorPayload) -> Self {
        Self::Api { status, payload }
    }

    /// Returns the embedded platform error, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&ApiErrorPayload> {
        match self {
            Self::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_envelope() {
        let body = r#"{"error": {"message": "Invalid parameter", "type": "OAuthException",
            "code": 100, "error_subcode": 33, "fbtrace_id": "abc"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.message, "Invalid parameter");
        assert_eq!(envelope.error.error_type.as_deref(), Some("OAuthException"));
        assert_eq!(envelope.error.code, Some(100));
        assert_eq!(envelope.error.error_subcode, Some(33));
        assert_eq!(envelope.error.fbtrace_id.as_deref(), Some("abc"));
    }

    #[test]
    fn partial_payload_defaults() {
        let envelope: ErrorEnvelope = serde_json::from_str(r#"{"error": {}}"#).unwrap();
        assert_eq!(envelope.error, ApiErrorPayload::default());
    }

    #[test]
    fn api_error_displays_message() {
        let err = GraphError::api(
            400,
            ApiErrorPayload {
                message: "Bad budget".to_string(),
                ..ApiErrorPayload::default()
            },
        );
        assert_eq!(err.to_string(), "Bad budget");
        assert!(err.payload().is_some());
    }
}
