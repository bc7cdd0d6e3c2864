//! Raw process output and JSON payload decoding

use crate::error::{ArcherError, Result};
use serde_json::Value;

/// Captured output of one transport process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RawResponse {
    pub fn new(exit_status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// A zero-exit response with the given stdout and empty stderr
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    pub fn succeeded(&self) -> bool {
        self.exit_status == 0
    }
}

/// Parses transport stdout as JSON
pub fn parse_payload(stdout: &str) -> Result<Value> {
    serde_json::from_str(stdout.trim()).map_err(|e| ArcherError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_trims_whitespace() {
        let value = parse_payload("\n  {\"IsSuccessful\": true}\r\n").expect("valid json");
        assert_eq!(value["IsSuccessful"], true);
    }

    #[test]
    fn test_parse_payload_rejects_garbage() {
        assert!(matches!(
            parse_payload("<html>Server Error</html>"),
            Err(ArcherError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_payload(""),
            Err(ArcherError::MalformedResponse(_))
        ));
    }
}
