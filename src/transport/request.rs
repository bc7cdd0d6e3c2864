//! Request descriptors and the process invocations rendered from them

use crate::error::Result;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// A single HTTP call against the Archer API, independent of any backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method, passed through verbatim (`GET`, `POST`)
    pub method: Option<String>,
    /// Path resolved against the configured base URL
    pub path: String,
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
    /// JSON body, sent only when present
    pub body: Option<Value>,
}

impl RequestDescriptor {
    /// Creates a descriptor for `path` with no method, headers or body
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Creates a GET descriptor
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path).with_method("GET")
    }

    /// Creates a POST descriptor carrying a JSON body
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(path).with_method("POST").with_body(body)
    }

    /// Sets the HTTP method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Adds a request header, replacing any previous value for the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the body serialized as JSON text
    pub fn body_json(&self) -> Option<String> {
        self.body.as_ref().map(Value::to_string)
    }

    /// Resolves the request path against `base`
    pub fn url(&self, base: &Url) -> Result<Url> {
        Ok(base.join(&self.path)?)
    }
}

/// A fully rendered external command: program, argument vector and stdin payload
///
/// Bodies travel on stdin so that credentials never show up in the process
/// list. `Display` renders the command the way a shell user would type it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the text written to the child's stdin
    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Returns true if any argument equals `flag`
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> Cow<'_, str> {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,%+".contains(c));
    if safe {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}
