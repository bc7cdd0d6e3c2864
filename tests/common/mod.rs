//! Common test utilities

#![allow(dead_code)]

use archer_audit::transport::{CommandRunner, Invocation, RawResponse};
use archer_audit::{ArcherError, ClientConfig, Credentials};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A CommandRunner that replays queued responses and records every call
pub struct ScriptedRunner {
    installed: Vec<String>,
    responses: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<Invocation>>,
    probes: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(installed: &[&str]) -> Self {
        Self {
            installed: installed.iter().map(|p| p.to_string()).collect(),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            probes: Mutex::new(Vec::new()),
        }
    }

    /// Queues the next response
    pub fn respond(self, response: RawResponse) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().expect("probes lock").clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    fn exists(&self, program: &str) -> bool {
        self.probes
            .lock()
            .expect("probes lock")
            .push(program.to_string());
        self.installed.iter().any(|p| p == program)
    }

    async fn run(&self, invocation: &Invocation) -> Result<RawResponse, ArcherError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        Ok(self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| RawResponse::new(127, "", "no scripted response")))
    }
}

/// A CommandRunner that echoes the request body back as the response
pub struct EchoRunner;

#[async_trait]
impl CommandRunner for EchoRunner {
    fn exists(&self, _program: &str) -> bool {
        true
    }

    async fn run(&self, invocation: &Invocation) -> Result<RawResponse, ArcherError> {
        Ok(RawResponse::ok(invocation.stdin.clone().unwrap_or_default()))
    }
}

/// Creates a test ClientConfig with a full credential set
pub fn test_config() -> ClientConfig {
    ClientConfig {
        url: "https://archer.test/".to_string(),
        credentials: Credentials::new("Prod", "sysadmin", Some("CORP".to_string()), "Passw0rd!"),
        ..ClientConfig::default()
    }
}

pub fn login_success(token: &str) -> RawResponse {
    RawResponse::ok(
        json!({
            "Links": [],
            "RequestedObject": {"SessionToken": token, "InstanceName": "Prod", "UserId": 2},
            "IsSuccessful": true,
            "ValidationMessages": []
        })
        .to_string(),
    )
}

pub fn login_failure(key: &str) -> RawResponse {
    RawResponse::ok(
        json!({
            "Links": [],
            "RequestedObject": null,
            "IsSuccessful": false,
            "ValidationMessages": [{"MessageKey": key, "Description": "Invalid login"}]
        })
        .to_string(),
    )
}

pub fn parameter_envelope(name: &str) -> Value {
    json!({
        "Links": [],
        "RequestedObject": {
            "Name": name,
            "MinPasswordLength": 12,
            "PasswordHistoryCount": 24,
            "MaxFailedLogins": 3
        },
        "IsSuccessful": true,
        "ValidationMessages": []
    })
}

/// Security parameter listing with the first `count` standard entries
pub fn parameter_listing(count: usize) -> RawResponse {
    let names = [
        "Default Administrative User",
        "General User Parameter",
        "Archer Services Parameter",
    ];
    let items: Vec<Value> = names
        .iter()
        .take(count)
        .map(|n| parameter_envelope(n))
        .collect();
    RawResponse::ok(Value::Array(items).to_string())
}
