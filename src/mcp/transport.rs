//! Newline-delimited stdio transport.
//!
//! Each message is one line of UTF-8 JSON on stdin (client to server) or
//! stdout (server to client). Serialized messages never contain raw
//! newlines because `serde_json` escapes them inside strings. stderr is left
//! to the logger.

use std::io;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Reads requests from stdin and writes replies to stdout.
pub struct StdioTransport {
    reader: BufReader<tokio::io::Stdin>,
    writer: tokio::io::Stdout,
}

impl StdioTransport {
    /// Attaches to the process's stdin and stdout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: tokio::io::stdout(),
        }
    }

    /// Reads the next line, without its terminator.
    ///
    /// Returns `None` once stdin is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Serializes `message` and writes it as one line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn write_message<T: Serialize + Sync>(&mut self, message: &T) -> io::Result<()> {
        let line = encode_line(message)?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes a message into a newline-terminated line.
///
/// # Errors
///
/// Returns an error if `message` cannot be serialized.
pub fn encode_line<T: Serialize>(message: &T) -> io::Result<String> {
    let mut line = serde_json::to_string(message)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    debug_assert!(!line.contains('\n'), "message must fit on one line");
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{JsonRpcResponse, RequestId, ToolCallResult};
    use crate::tools::ResponseEnvelope;
    use serde_json::json;

    #[test]
    fn pretty_printed_payloads_stay_on_one_line() {
        let text = ResponseEnvelope::ok(json!({"a": [1, 2]}), "multi\nline").render();
        assert!(text.contains('\n'));

        let result = serde_json::to_value(ToolCallResult::text(text)).unwrap();
        let line = encode_line(&JsonRpcResponse::success(RequestId::Number(1), result)).unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }
}
