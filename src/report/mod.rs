//! Security parameter reports

pub mod json;

use crate::client::ArcherClient;
use crate::error::Result;
use crate::payload::{SecurityParameter, SecurityParameterKind};
use crate::transport::TransportKind;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One security parameter as recorded in a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterEntry {
    /// Human-readable parameter label
    pub label: String,
    /// Position in the security parameter listing
    pub index: usize,
    /// The parameter's `RequestedObject`
    pub fields: Value,
}

/// Snapshot of an instance's security parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterReport {
    /// Unique report identifier
    pub report_id: String,
    /// Archer instance name
    pub instance: Option<String>,
    /// Base URL the parameters were fetched from
    pub url: String,
    /// Backend that carried the requests
    pub transport: TransportKind,
    /// Collection time (local timezone)
    pub collected_at: DateTime<Local>,
    pub parameters: Vec<ParameterEntry>,
}

impl ParameterReport {
    /// Creates an empty report for `client`
    pub fn new(client: &ArcherClient) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            instance: client.instance_name().map(str::to_string),
            url: client.base_url().to_string(),
            transport: client.transport_kind(),
            collected_at: Local::now(),
            parameters: Vec::new(),
        }
    }

    /// Fetches the listing once and records all three parameters
    pub async fn collect(client: &mut ArcherClient) -> Result<Self> {
        let listing = client.fetch_security_parameters().await?;
        let mut report = Self::new(client);
        for kind in SecurityParameterKind::ALL {
            report.push(kind, SecurityParameter::select(&listing, kind)?);
        }
        Ok(report)
    }

    pub fn push(&mut self, kind: SecurityParameterKind, parameter: SecurityParameter) {
        self.parameters.push(ParameterEntry {
            label: kind.to_string(),
            index: kind.index(),
            fields: parameter.into_value(),
        });
    }
}
