//! Session token lifecycle
//!
//! A [`SessionManager`] starts `Unauthenticated` unless its [`TokenSlot`]
//! already holds a token. Logging in moves it to `Authenticated`, where it
//! stays: an expired or revoked token is never refreshed automatically.

use crate::error::{ArcherError, Result};
use crate::models::Credentials;
use crate::payload;
use crate::transport::{CommandRunner, RequestDescriptor, Transport};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// Path of the login endpoint
pub const LOGIN_PATH: &str = "/api/core/security/login";

/// Environment variable used by [`TokenSlot::Environment`] unless another is named
pub const DEFAULT_TOKEN_VAR: &str = "ARCHER_SESSION_TOKEN";

/// An Archer session token
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header for authenticated calls
    pub fn authorization(&self) -> String {
        format!("Archer session-id={}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Where the session token is kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenSlot {
    /// Owned by the session manager alone
    #[default]
    Memory,
    /// Shared through the named environment variable, so every client in the
    /// process reuses one login
    Environment(String),
}

impl TokenSlot {
    /// Environment slot under [`DEFAULT_TOKEN_VAR`]
    pub fn environment() -> Self {
        TokenSlot::Environment(DEFAULT_TOKEN_VAR.to_string())
    }

    fn load(&self) -> Option<SessionToken> {
        match self {
            TokenSlot::Memory => None,
            TokenSlot::Environment(var) => std::env::var(var)
                .ok()
                .filter(|t| !t.is_empty())
                .map(SessionToken),
        }
    }

    fn store(&self, token: &SessionToken) {
        if let TokenSlot::Environment(var) = self {
            std::env::set_var(var, token.as_str());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Owns the credentials and the single session token
#[derive(Debug)]
pub struct SessionManager {
    credentials: Credentials,
    slot: TokenSlot,
    token: Option<SessionToken>,
}

impl SessionManager {
    pub fn new(credentials: Credentials, slot: TokenSlot) -> Self {
        let token = slot.load();
        if token.is_some() {
            debug!("Reusing session token from {slot:?}");
        }
        Self {
            credentials,
            slot,
            token,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn state(&self) -> SessionState {
        if self.token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn session_token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Posts the credentials to the login endpoint and stores the returned token
    pub async fn login(
        &mut self,
        transport: &Transport,
        runner: &dyn CommandRunner,
    ) -> Result<&SessionToken> {
        info!(
            "Authenticating to {} as {}",
            transport.settings().base_url,
            self.credentials.username.as_deref().unwrap_or("<anonymous>")
        );

        let body = serde_json::to_value(&self.credentials)?;
        let response = transport
            .execute(runner, &RequestDescriptor::post(LOGIN_PATH, body))
            .await?;

        payload::validate(&response).map_err(|e| match e {
            ArcherError::PayloadError(key) => ArcherError::AuthenticationFailed(key),
            other => other,
        })?;

        let token = response
            .pointer("/RequestedObject/SessionToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(SessionToken::new)
            .ok_or_else(|| {
                ArcherError::MalformedResponse(
                    "login response did not include RequestedObject.SessionToken".to_string(),
                )
            })?;

        self.slot.store(&token);
        info!("Authentication successful");
        Ok(&*self.token.insert(token))
    }

    /// Logs in only if no token is held yet
    pub async fn ensure_authenticated(
        &mut self,
        transport: &Transport,
        runner: &dyn CommandRunner,
    ) -> Result<&SessionToken> {
        if self.token.is_none() {
            self.login(transport, runner).await?;
        }
        self.token
            .as_ref()
            .ok_or_else(|| ArcherError::AuthenticationFailed("no session token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header_value() {
        let token = SessionToken::new("8F2B");
        assert_eq!(token.authorization(), "Archer session-id=8F2B");
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("very-secret");
        assert!(!format!("{token:?}").contains("very-secret"));
    }

    #[test]
    fn test_memory_slot_starts_unauthenticated() {
        let manager = SessionManager::new(Credentials::default(), TokenSlot::Memory);
        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert!(manager.session_token().is_none());
    }

    #[test]
    fn test_default_environment_slot_name() {
        assert_eq!(
            TokenSlot::environment(),
            TokenSlot::Environment("ARCHER_SESSION_TOKEN".to_string())
        );
    }
}
