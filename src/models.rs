//! Core data models for the Archer client

use crate::session::TokenSlot;
use crate::transport::TransportKind;
use serde::Serialize;
use std::fmt;

/// Base URL used when none is configured
pub const DEFAULT_URL: &str = "https://localhost/";

/// Login credentials, serialized in the shape the login endpoint expects
///
/// Absent values are sent as JSON `null`.
#[derive(Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub instance_name: Option<String>,
    pub username: Option<String>,
    pub user_domain: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(
        instance_name: impl Into<String>,
        username: impl Into<String>,
        user_domain: Option<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            instance_name: Some(instance_name.into()),
            username: Some(username.into()),
            user_domain,
            password: Some(password.into()),
        }
    }
}

// Password is never printed
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("instance_name", &self.instance_name)
            .field("username", &self.username)
            .field("user_domain", &self.user_domain)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Everything needed to construct an [`crate::client::ArcherClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every API path is resolved against
    pub url: String,
    /// Credentials posted to the login endpoint
    pub credentials: Credentials,
    /// When false, backends skip certificate validation
    pub ssl_verify: bool,
    /// Forces a backend instead of probing curl then PowerShell
    pub transport: Option<TransportKind>,
    /// Where the session token lives
    pub token_slot: TokenSlot,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            credentials: Credentials::default(),
            ssl_verify: true,
            transport: None,
            token_slot: TokenSlot::Memory,
        }
    }
}
