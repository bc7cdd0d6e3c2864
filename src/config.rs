//! Configuration management for the Archer client

use crate::error::Result;
use crate::models::ClientConfig;
use crate::session::{TokenSlot, DEFAULT_TOKEN_VAR};
use crate::transport::TransportKind;
use serde::Deserialize;
use std::path::Path;

/// Environment variable consulted for the password when none is configured
pub const PASSWORD_ENV_VAR: &str = "ARCHER_PASSWORD";

/// File-based configuration structure matching config/default.toml
#[derive(Debug, Deserialize)]
struct FileConfig {
    server: Option<ServerSection>,
    credentials: Option<CredentialsSection>,
    session: Option<SessionSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    url: Option<String>,
    ssl_verify: Option<bool>,
    transport: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CredentialsSection {
    instance_name: Option<String>,
    username: Option<String>,
    user_domain: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionSection {
    share_token: Option<bool>,
    token_var: Option<String>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses TOML configuration text and merges with defaults
pub fn parse_config(content: &str) -> Result<ClientConfig> {
    let file_config: FileConfig = toml::from_str(content)?;

    let mut config = ClientConfig::default();

    if let Some(server) = file_config.server {
        if let Some(url) = server.url {
            config.url = url;
        }
        if let Some(verify) = server.ssl_verify {
            config.ssl_verify = verify;
        }
        if let Some(transport) = server.transport {
            config.transport = Some(transport.parse()?);
        }
    }

    if let Some(creds) = file_config.credentials {
        config.credentials.instance_name = creds.instance_name;
        config.credentials.username = creds.username;
        config.credentials.user_domain = creds.user_domain;
        config.credentials.password = creds.password;
    }

    if let Some(session) = file_config.session {
        let shared = session
            .share_token
            .unwrap_or(session.token_var.is_some());
        if shared {
            config.token_slot = TokenSlot::Environment(
                session
                    .token_var
                    .unwrap_or_else(|| DEFAULT_TOKEN_VAR.to_string()),
            );
        }
    }

    Ok(config)
}

/// Merges CLI arguments into an existing ClientConfig.
///
/// A password still missing afterwards is taken from [`PASSWORD_ENV_VAR`].
#[allow(clippy::too_many_arguments)]
pub fn merge_cli_args(
    config: &mut ClientConfig,
    url: Option<String>,
    instance_name: Option<String>,
    username: Option<String>,
    user_domain: Option<String>,
    password: Option<String>,
    insecure: bool,
    transport: Option<TransportKind>,
) {
    if let Some(u) = url {
        config.url = u;
    }
    if let Some(i) = instance_name {
        config.credentials.instance_name = Some(i);
    }
    if let Some(u) = username {
        config.credentials.username = Some(u);
    }
    if let Some(d) = user_domain {
        config.credentials.user_domain = Some(d);
    }
    if let Some(p) = password {
        config.credentials.password = Some(p);
    }
    if insecure {
        config.ssl_verify = false;
    }
    if let Some(t) = transport {
        config.transport = Some(t);
    }

    if config.credentials.password.is_none() {
        config.credentials.password = std::env::var(PASSWORD_ENV_VAR)
            .ok()
            .filter(|p| !p.is_empty());
    }
}
