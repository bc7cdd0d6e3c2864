//! Error types for the Archer client

use crate::transport::TransportKind;
use thiserror::Error;

/// Main error type for Archer operations
#[derive(Debug, Error)]
pub enum ArcherError {
    #[error("No supported HTTP transport found on the host (looked for: {0})")]
    TransportUnavailable(String),

    #[error("Error fetching Archer data from {backend} {url}: {message}")]
    TransportError {
        backend: TransportKind,
        url: String,
        message: String,
    },

    #[error("Connection refused - please check the URL {url} for accuracy")]
    ConnectionRefused { url: String },

    #[error("Connection refused - peer certificate for {url} is not recognized; try setting ssl_verify to false")]
    CertificateRejected { url: String },

    #[error("Error parsing JSON response from Archer: {0}")]
    MalformedResponse(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Message: {0}")]
    PayloadError(String),

    #[error("Security parameter index {index} out of range ({len} returned)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ArcherError {
    /// Returns true for transport-layer failures a caller may choose to retry.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ArcherError::TransportError { .. } | ArcherError::ConnectionRefused { .. }
        )
    }
}

/// Result type alias for Archer operations
pub type Result<T> = std::result::Result<T, ArcherError>;
