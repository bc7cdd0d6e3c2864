//! Transport backends: rendering requests as curl or PowerShell commands and
//! classifying their output

pub mod curl;
pub mod powershell;
pub mod request;
pub mod response;
pub mod runner;

pub use curl::CurlBackend;
pub use powershell::PowerShellBackend;
pub use request::{Invocation, RequestDescriptor};
pub use response::{parse_payload, RawResponse};
pub use runner::{CommandRunner, SystemRunner};

use crate::error::{ArcherError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use url::Url;

/// The command-line HTTP tool a request is carried by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    #[serde(rename = "curl")]
    Curl,
    #[serde(rename = "powershell", alias = "pwsh")]
    PowerShell,
}

impl TransportKind {
    /// Backends in the order they are probed when none is configured
    pub const PROBE_ORDER: [TransportKind; 2] = [TransportKind::Curl, TransportKind::PowerShell];

    /// Executable looked up on the host
    pub fn program(self) -> &'static str {
        match self {
            TransportKind::Curl => "curl",
            TransportKind::PowerShell => "pwsh",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Curl => write!(f, "curl"),
            TransportKind::PowerShell => write!(f, "Invoke-RestMethod"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = ArcherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curl" => Ok(TransportKind::Curl),
            "powershell" | "pwsh" => Ok(TransportKind::PowerShell),
            other => Err(ArcherError::ConfigError(format!(
                "Unknown transport '{other}' (expected curl or powershell)"
            ))),
        }
    }
}

/// Settings shared by every backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub base_url: Url,
    pub ssl_verify: bool,
}

/// Uniform capability every backend provides
pub trait Backend {
    fn kind(&self) -> TransportKind;

    fn settings(&self) -> &TransportSettings;

    /// Renders the command that performs `request`
    fn build(&self, request: &RequestDescriptor) -> Result<Invocation>;

    /// Maps process output to a parsed JSON payload or a classified failure
    fn classify(&self, response: &RawResponse) -> Result<Value>;
}

/// The backend selected for this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Curl(CurlBackend),
    PowerShell(PowerShellBackend),
}

impl Transport {
    pub fn new(kind: TransportKind, settings: TransportSettings) -> Self {
        match kind {
            TransportKind::Curl => Transport::Curl(CurlBackend::new(settings)),
            TransportKind::PowerShell => Transport::PowerShell(PowerShellBackend::new(settings)),
        }
    }

    /// Probes the host and binds to the first available backend.
    ///
    /// With a `preference`, only that backend is considered. Nothing but
    /// `CommandRunner::exists` is called, so an unusable host fails before any
    /// request is attempted.
    pub fn select(
        runner: &dyn CommandRunner,
        settings: TransportSettings,
        preference: Option<TransportKind>,
    ) -> Result<Self> {
        let candidates: Vec<TransportKind> = match preference {
            Some(kind) => vec![kind],
            None => TransportKind::PROBE_ORDER.to_vec(),
        };

        for kind in &candidates {
            if runner.exists(kind.program()) {
                info!("Using {} transport ({})", kind, kind.program());
                return Ok(Self::new(*kind, settings));
            }
            debug!("{} not found on host", kind.program());
        }

        let looked_for: Vec<&str> = candidates.iter().map(|k| k.program()).collect();
        Err(ArcherError::TransportUnavailable(looked_for.join(", ")))
    }

    fn backend(&self) -> &dyn Backend {
        match self {
            Transport::Curl(b) => b,
            Transport::PowerShell(b) => b,
        }
    }

    pub fn kind(&self) -> TransportKind {
        self.backend().kind()
    }

    pub fn settings(&self) -> &TransportSettings {
        self.backend().settings()
    }

    pub fn build(&self, request: &RequestDescriptor) -> Result<Invocation> {
        self.backend().build(request)
    }

    pub fn classify(&self, response: &RawResponse) -> Result<Value> {
        self.backend().classify(response)
    }

    /// Builds, runs and classifies one request
    pub async fn execute(
        &self,
        runner: &dyn CommandRunner,
        request: &RequestDescriptor,
    ) -> Result<Value> {
        let invocation = self.build(request)?;
        let url = request.url(&self.settings().base_url)?;
        debug!(
            "{} {url} via {}",
            request.method.as_deref().unwrap_or("GET"),
            self.kind()
        );

        let raw = runner.run(&invocation).await.map_err(|e| match e {
            ArcherError::IoError(err) => ArcherError::TransportError {
                backend: self.kind(),
                url: self.settings().base_url.to_string(),
                message: format!("could not run {}: {err}", invocation.program),
            },
            other => other,
        })?;

        self.classify(&raw)
    }
}
