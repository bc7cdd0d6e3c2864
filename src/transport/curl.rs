//! curl backend

use crate::error::{ArcherError, Result};
use crate::transport::request::{Invocation, RequestDescriptor};
use crate::transport::response::{parse_payload, RawResponse};
use crate::transport::{Backend, TransportKind, TransportSettings};
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Carries requests with the `curl` executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlBackend {
    settings: TransportSettings,
}

impl CurlBackend {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }

    /// Extracts curl's own `curl: (N) ...` error line from stderr
    fn error_line(stderr: &str) -> Option<String> {
        let re = Regex::new(r"curl: \(\d+\).*").ok()?;
        re.find(stderr).map(|m| m.as_str().trim().to_string())
    }
}

impl Backend for CurlBackend {
    fn kind(&self) -> TransportKind {
        TransportKind::Curl
    }

    fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    fn build(&self, request: &RequestDescriptor) -> Result<Invocation> {
        let url = request.url(&self.settings.base_url)?;

        let mut inv = Invocation::new("curl").arg("-sS");
        if !self.settings.ssl_verify {
            inv = inv.arg("-k");
        }
        if let Some(method) = &request.method {
            inv = inv.arg("-X").arg(method);
        }
        for (name, value) in &request.headers {
            inv = inv.arg("-H").arg(format!("{name}: {value}"));
        }
        inv = inv.arg("-H").arg("Content-Type: application/json");
        if let Some(body) = request.body_json() {
            inv = inv.arg("--data-binary").arg("@-").with_stdin(body);
        }

        Ok(inv.arg(url.as_str()))
    }

    fn classify(&self, response: &RawResponse) -> Result<Value> {
        if !response.succeeded() {
            let message = Self::error_line(&response.stderr).unwrap_or_else(|| {
                let stderr = response.stderr.trim();
                if stderr.is_empty() {
                    format!("curl exited with status {}", response.exit_status)
                } else {
                    stderr.to_string()
                }
            });
            warn!("curl request failed: {message}");
            return Err(ArcherError::TransportError {
                backend: TransportKind::Curl,
                url: self.settings.base_url.to_string(),
                message,
            });
        }

        parse_payload(&response.stdout)
    }
}
