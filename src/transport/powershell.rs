//! PowerShell `Invoke-RestMethod` backend
//!
//! The request is rendered as a `pwsh -Command` script whose result is piped
//! through `ConvertTo-Json`, so stdout carries JSON text just as curl does.
//! Failures surface as PowerShell error records on stderr and are classified
//! by their text.

use crate::error::{ArcherError, Result};
use crate::transport::request::{Invocation, RequestDescriptor};
use crate::transport::response::{parse_payload, RawResponse};
use crate::transport::{Backend, TransportKind, TransportSettings};
use regex::Regex;
use serde_json::Value;
use tracing::warn;

const CONNECTION_REFUSED_PATTERN: &str =
    r"No HTTP resource was found that matches the request URI|DNS_FAIL";

const CERTIFICATE_REJECTED_PATTERN: &str =
    r"The remote certificate is invalid according to the validation procedure\.";

/// `ConvertTo-Json` truncates nested objects beyond this depth
const JSON_DEPTH: u32 = 10;

/// Carries requests with PowerShell's `Invoke-RestMethod`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerShellBackend {
    settings: TransportSettings,
}

impl PowerShellBackend {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }

    /// Renders the `-Command` script for `request`
    pub fn script(&self, request: &RequestDescriptor) -> Result<String> {
        let url = request.url(&self.settings.base_url)?;

        let mut parts: Vec<String> = vec!["Invoke-RestMethod".to_string()];
        if !self.settings.ssl_verify {
            parts.push("-SkipCertificateCheck".to_string());
        }
        if let Some(method) = &request.method {
            parts.push(format!("-Method {method}"));
        }
        if !request.headers.is_empty() {
            let entries: Vec<String> = request
                .headers
                .iter()
                .map(|(name, value)| format!("{} = {}", quote(name), quote(value)))
                .collect();
            parts.push(format!("-Headers @{{ {} }}", entries.join("; ")));
        }
        parts.push("-ContentType 'application/json'".to_string());
        if request.body.is_some() {
            parts.push("-Body $body".to_string());
        }
        parts.push(format!("-Uri {}", quote(url.as_str())));
        parts.push(format!("| ConvertTo-Json -Depth {JSON_DEPTH}"));

        let command = parts.join(" ");
        if request.body.is_some() {
            Ok(format!("$body = [Console]::In.ReadToEnd(); {command}"))
        } else {
            Ok(command)
        }
    }
}

/// Single-quoted PowerShell string literal
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn stderr_matches(pattern: &str, stderr: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(stderr))
        .unwrap_or(false)
}

impl Backend for PowerShellBackend {
    fn kind(&self) -> TransportKind {
        TransportKind::PowerShell
    }

    fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    fn build(&self, request: &RequestDescriptor) -> Result<Invocation> {
        let inv = Invocation::new("pwsh")
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg(self.script(request)?);

        Ok(match request.body_json() {
            Some(body) => inv.with_stdin(body),
            None => inv,
        })
    }

    fn classify(&self, response: &RawResponse) -> Result<Value> {
        let url = self.settings.base_url.to_string();

        if stderr_matches(CONNECTION_REFUSED_PATTERN, &response.stderr) {
            warn!("Invoke-RestMethod could not reach {url}");
            return Err(ArcherError::ConnectionRefused { url });
        }

        if stderr_matches(CERTIFICATE_REJECTED_PATTERN, &response.stderr) {
            warn!("Invoke-RestMethod rejected the certificate presented by {url}");
            return Err(ArcherError::CertificateRejected { url });
        }

        if !response.succeeded() {
            return Err(ArcherError::TransportError {
                backend: TransportKind::PowerShell,
                url,
                message: response.stderr.trim().to_string(),
            });
        }

        parse_payload(&response.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    fn backend(ssl_verify: bool) -> PowerShellBackend {
        PowerShellBackend::new(TransportSettings {
            base_url: Url::parse("https://localhost/").expect("valid url"),
            ssl_verify,
        })
    }

    #[test]
    fn test_script_for_authenticated_get() {
        let req = RequestDescriptor::get("/api/core/system/securityparameter")
            .with_header("Authorization", "Archer session-id=ABC");
        let script = backend(true).script(&req).expect("renders");

        assert_eq!(
            script,
            "Invoke-RestMethod -Method GET -Headers @{ 'Authorization' = 'Archer session-id=ABC' } \
             -ContentType 'application/json' -Uri 'https://localhost/api/core/system/securityparameter' \
             | ConvertTo-Json -Depth 10"
        );
    }

    #[test]
    fn test_script_reads_body_from_stdin() {
        let req = RequestDescriptor::post("/api/core/security/login", json!({"Password": "p'w"}));
        let inv = backend(false).build(&req).expect("builds");
        let script = inv.args.last().expect("script arg");

        assert!(script.starts_with("$body = [Console]::In.ReadToEnd();"));
        assert!(script.contains("-SkipCertificateCheck"));
        assert!(script.contains("-Body $body"));
        assert!(!script.contains("p'w"));
        assert_eq!(inv.stdin.as_deref(), Some(r#"{"Password":"p'w"}"#));
    }

    #[test]
    fn test_header_values_are_escaped() {
        let req = RequestDescriptor::get("/x").with_header("X-Note", "it's");
        let script = backend(true).script(&req).expect("renders");
        assert!(script.contains("'X-Note' = 'it''s'"));
    }

    #[test]
    fn test_connection_refused_regardless_of_exit_status() {
        for status in [0, 1] {
            let raw = RawResponse::new(
                status,
                "",
                "Invoke-RestMethod: No HTTP resource was found that matches the request URI 'https://localhost/api'.",
            );
            assert!(matches!(
                backend(true).classify(&raw),
                Err(ArcherError::ConnectionRefused { .. })
            ));
        }
    }

    #[test]
    fn test_dns_failure_is_connection_refused() {
        let raw = RawResponse::new(1, "", "error: DNS_FAIL while resolving host");
        let err = backend(true).classify(&raw).expect_err("fails");
        assert!(err.to_string().contains("https://localhost/"));
    }

    #[test]
    fn test_certificate_rejected() {
        let raw = RawResponse::new(
            1,
            "",
            "The SSL connection could not be established. The remote certificate is invalid according to the validation procedure.",
        );
        assert!(matches!(
            backend(true).classify(&raw),
            Err(ArcherError::CertificateRejected { .. })
        ));
    }

    #[test]
    fn test_other_failures_carry_stderr() {
        let raw = RawResponse::new(1, "", "  Invoke-RestMethod: Response status code does not indicate success: 500\n");
        match backend(true).classify(&raw) {
            Err(ArcherError::TransportError { backend, message, .. }) => {
                assert_eq!(backend, TransportKind::PowerShell);
                assert_eq!(
                    message,
                    "Invoke-RestMethod: Response status code does not indicate success: 500"
                );
            }
            other => panic!("expected TransportError, got {other:?}"),
        }
    }
}
