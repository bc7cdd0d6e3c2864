//! Response envelopes and security-parameter accessors
//!
//! Every Archer API response is wrapped in an envelope carrying
//! `IsSuccessful`, `RequestedObject` and `ValidationMessages`. The security
//! parameter endpoint returns a sequence of such envelopes in a fixed order:
//! administrative user, general user, Archer services.

use crate::error::{ArcherError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Path of the security parameter listing
pub const SECURITY_PARAMETERS_PATH: &str = "/api/core/system/securityparameter";

const UNSUCCESSFUL_REQUEST: &str = "request was not successful";

/// One entry of an envelope's `ValidationMessages`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationMessage {
    #[serde(default)]
    pub message_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Standard Archer response envelope
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(default)]
    pub is_successful: Option<bool>,
    #[serde(default)]
    pub requested_object: Option<Value>,
    #[serde(default)]
    pub validation_messages: Option<Vec<ValidationMessage>>,
}

impl Envelope {
    pub fn from_value(value: &Value) -> Result<Self> {
        Envelope::deserialize(value).map_err(|e| ArcherError::MalformedResponse(e.to_string()))
    }

    /// A missing `IsSuccessful` counts as failure
    pub fn is_successful(&self) -> bool {
        self.is_successful.unwrap_or(false)
    }

    /// Key of the first validation message, if any
    pub fn first_message_key(&self) -> Option<&str> {
        self.validation_messages
            .as_deref()?
            .first()?
            .message_key
            .as_deref()
    }

    fn failure_message(&self) -> String {
        self.first_message_key()
            .or_else(|| {
                self.validation_messages
                    .as_deref()?
                    .first()?
                    .description
                    .as_deref()
            })
            .unwrap_or(UNSUCCESSFUL_REQUEST)
            .to_string()
    }

    /// Fails with `PayloadError` unless the envelope reports success
    pub fn validate(&self) -> Result<()> {
        if self.is_successful() {
            Ok(())
        } else {
            Err(ArcherError::PayloadError(self.failure_message()))
        }
    }
}

/// Checks the `IsSuccessful` flag of a decoded payload
pub fn validate(payload: &Value) -> Result<()> {
    Envelope::from_value(payload)?.validate()
}

/// Normalizes the security parameter response to a sequence.
///
/// `ConvertTo-Json` emits a lone object instead of a one-element array.
pub fn into_sequence(payload: Value) -> Result<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        other => Err(ArcherError::MalformedResponse(format!(
            "expected a list of security parameters, got {other}"
        ))),
    }
}

/// Which security parameter an accessor returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityParameterKind {
    AdministrativeUser,
    GeneralUser,
    Services,
}

impl SecurityParameterKind {
    pub const ALL: [SecurityParameterKind; 3] = [
        SecurityParameterKind::AdministrativeUser,
        SecurityParameterKind::GeneralUser,
        SecurityParameterKind::Services,
    ];

    /// Position in the security parameter response
    pub fn index(self) -> usize {
        match self {
            SecurityParameterKind::AdministrativeUser => 0,
            SecurityParameterKind::GeneralUser => 1,
            SecurityParameterKind::Services => 2,
        }
    }
}

impl fmt::Display for SecurityParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityParameterKind::AdministrativeUser => write!(f, "Default Administrative User"),
            SecurityParameterKind::GeneralUser => write!(f, "General User Parameter"),
            SecurityParameterKind::Services => write!(f, "Archer Services Parameter"),
        }
    }
}

/// The `RequestedObject` of one successful security parameter envelope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityParameter {
    fields: Map<String, Value>,
}

impl SecurityParameter {
    /// Validates `envelope` and takes its `RequestedObject`
    pub fn from_envelope(envelope: &Value) -> Result<Self> {
        let envelope = Envelope::from_value(envelope)?;
        envelope.validate()?;
        match envelope.requested_object {
            Some(Value::Object(fields)) => Ok(Self { fields }),
            _ => Err(ArcherError::MalformedResponse(
                "security parameter has no RequestedObject".to_string(),
            )),
        }
    }

    /// Picks the entry for `kind` out of a fetched sequence
    pub fn select(payloads: &[Value], kind: SecurityParameterKind) -> Result<Self> {
        let index = kind.index();
        let envelope = payloads.get(index).ok_or(ArcherError::IndexOutOfRange {
            index,
            len: payloads.len(),
        })?;
        Self::from_envelope(envelope)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("Name")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}
