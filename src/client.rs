//! Authenticated Archer client
//!
//! Ties together backend selection, the session manager and the payload
//! accessors. Every accessor call performs its own round trip; nothing is
//! cached between calls.

use crate::error::Result;
use crate::models::ClientConfig;
use crate::payload::{self, SecurityParameter, SecurityParameterKind, SECURITY_PARAMETERS_PATH};
use crate::session::{SessionManager, SessionState, SessionToken};
use crate::transport::{
    CommandRunner, RequestDescriptor, SystemRunner, Transport, TransportKind, TransportSettings,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Session-holding client for one Archer instance
pub struct ArcherClient {
    transport: Transport,
    runner: Arc<dyn CommandRunner>,
    session: SessionManager,
}

impl ArcherClient {
    /// Connects with the host's own curl or PowerShell
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with_runner(config, Arc::new(SystemRunner::new())).await
    }

    /// Selects a backend and logs in unless a session token is already held
    pub async fn connect_with_runner(
        config: ClientConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self> {
        let mut client = Self::new(config, runner)?;
        client.ensure_authenticated().await?;
        Ok(client)
    }

    /// Builds the client without contacting the server
    pub fn new(config: ClientConfig, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let settings = TransportSettings {
            base_url: Url::parse(&config.url)?,
            ssl_verify: config.ssl_verify,
        };
        if !settings.ssl_verify {
            debug!("Certificate validation disabled for {}", settings.base_url);
        }

        let transport = Transport::select(runner.as_ref(), settings, config.transport)?;
        let session = SessionManager::new(config.credentials, config.token_slot);

        Ok(Self {
            transport,
            runner,
            session,
        })
    }

    /// Logs in if the session is still unauthenticated
    pub async fn ensure_authenticated(&mut self) -> Result<&SessionToken> {
        self.session
            .ensure_authenticated(&self.transport, self.runner.as_ref())
            .await
    }

    /// Logs in unconditionally, replacing any held token
    pub async fn login(&mut self) -> Result<&SessionToken> {
        self.session
            .login(&self.transport, self.runner.as_ref())
            .await
    }

    pub fn session_token(&self) -> Option<&SessionToken> {
        self.session.session_token()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn base_url(&self) -> &Url {
        &self.transport.settings().base_url
    }

    pub fn instance_name(&self) -> Option<&str> {
        self.session.credentials().instance_name.as_deref()
    }

    /// Fetches the full security parameter listing, one envelope per entry.
    ///
    /// Logs in first when no session token is held yet.
    pub async fn fetch_security_parameters(&mut self) -> Result<Vec<Value>> {
        let authorization = self.ensure_authenticated().await?.authorization();

        let request = RequestDescriptor::get(SECURITY_PARAMETERS_PATH)
            .with_header("Authorization", authorization);
        let response = self
            .transport
            .execute(self.runner.as_ref(), &request)
            .await?;

        let parameters = payload::into_sequence(response)?;
        info!("Fetched {} security parameters", parameters.len());
        Ok(parameters)
    }

    /// Fetches the listing and returns the entry for `kind`
    pub async fn security_parameter(&mut self, kind: SecurityParameterKind) -> Result<SecurityParameter> {
        let parameters = self.fetch_security_parameters().await?;
        SecurityParameter::select(&parameters, kind)
    }

    pub async fn administrative_user(&mut self) -> Result<SecurityParameter> {
        self.security_parameter(SecurityParameterKind::AdministrativeUser)
            .await
    }

    pub async fn general_user_parameter(&mut self) -> Result<SecurityParameter> {
        self.security_parameter(SecurityParameterKind::GeneralUser)
            .await
    }

    pub async fn services_parameter(&mut self) -> Result<SecurityParameter> {
        self.security_parameter(SecurityParameterKind::Services)
            .await
    }
}

impl fmt::Display for ArcherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Archer Instance {}", self.instance_name().unwrap_or_default())
    }
}

impl fmt::Debug for ArcherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcherClient")
            .field("transport", &self.transport)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
