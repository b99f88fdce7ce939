//! Request and response values passed through a [`Transport`](super::Transport)

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Connect/read timeout pair
///
/// `None` means no limit: the call may wait indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeout {
    /// Limit on establishing a connection
    pub connect: Option<Duration>,
    /// Limit on receiving the full response
    pub read: Option<Duration>,
}

impl Timeout {
    /// No timeouts
    pub fn none() -> Self {
        Self::default()
    }

    /// Use the same limit for connecting and reading
    pub fn uniform(limit: Duration) -> Self {
        Self {
            connect: Some(limit),
            read: Some(limit),
        }
    }

    /// Separate connect and read limits
    pub fn new(connect: Duration, read: Duration) -> Self {
        Self {
            connect: Some(connect),
            read: Some(read),
        }
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// Query parameters, in order. Keys may repeat (e.g. `fields`, `records`).
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override the read timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append the same query key once per value
    #[must_use]
    pub fn query_all<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query
            .extend(values.into_iter().map(|v| (key.to_string(), v.into())));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// First value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a (possibly repeated) query parameter
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// A received response: status code plus the raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    status: u16,
    body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Raw body text
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::decode(format!(
                "HTTP {} body is not valid JSON for the expected shape: {e}",
                self.status
            ))
        })
    }

    /// Decode the body as an untyped JSON value
    pub fn json_value(&self) -> Result<Value> {
        self.json()
    }

    /// Turn a non-2xx response into [`Error::HttpStatus`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_status(self.status, self.body))
        }
    }
}
