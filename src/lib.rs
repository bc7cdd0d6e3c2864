//! Archer Audit - session-managed client for RSA Archer security parameters
//!
//! Authenticates against the Archer REST API, holds the session token, and
//! retrieves security-configuration metadata. Requests are carried by whichever
//! command-line HTTP tool the host provides: curl, or PowerShell's
//! `Invoke-RestMethod`.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod payload;
pub mod report;
pub mod session;
pub mod transport;

pub use client::ArcherClient;
pub use error::{ArcherError, Result};
pub use models::{ClientConfig, Credentials};
pub use payload::{SecurityParameter, SecurityParameterKind};
pub use session::{SessionState, SessionToken, TokenSlot};
pub use transport::{CommandRunner, SystemRunner, TransportKind};
