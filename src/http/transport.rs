//! Transport trait and the reqwest-backed default
//!
//! A [`Transport`] sends one request and hands back the status and body
//! untouched. [`HttpTransport`] either dispatches through a caller-supplied
//! [`Session`] (one pooled client reused across calls) or builds a fresh
//! client for every request.

use super::request::{RequestConfig, Timeout, TransportResponse};
use crate::error::{Error, Result};
use crate::types::Method;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sends HTTP requests on behalf of the client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response
    async fn send(&self, method: Method, url: &str, config: RequestConfig)
        -> Result<TransportResponse>;

    /// Open a transport that reuses connections across calls
    ///
    /// Returns `None` when this transport already reuses connections or
    /// cannot do so; callers then keep using `self`.
    fn open_session(&self) -> Result<Option<Box<dyn Transport>>> {
        Ok(None)
    }

    async fn get(&self, url: &str, config: RequestConfig) -> Result<TransportResponse> {
        self.send(Method::GET, url, config).await
    }

    async fn post(&self, url: &str, config: RequestConfig) -> Result<TransportResponse> {
        self.send(Method::POST, url, config).await
    }

    async fn patch(&self, url: &str, config: RequestConfig) -> Result<TransportResponse> {
        self.send(Method::PATCH, url, config).await
    }

    async fn put(&self, url: &str, config: RequestConfig) -> Result<TransportResponse> {
        self.send(Method::PUT, url, config).await
    }

    async fn delete(&self, url: &str, config: RequestConfig) -> Result<TransportResponse> {
        self.send(Method::DELETE, url, config).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<TransportResponse> {
        (**self).send(method, url, config).await
    }

    fn open_session(&self) -> Result<Option<Box<dyn Transport>>> {
        (**self).open_session()
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<TransportResponse> {
        (**self).send(method, url, config).await
    }

    fn open_session(&self) -> Result<Option<Box<dyn Transport>>> {
        (**self).open_session()
    }
}

/// A reusable connection pool
///
/// Cloning is cheap and clones share connections. Build one per logical
/// workload and hand it to [`HttpTransport::with_session`].
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
}

impl Session {
    /// Build a session honouring the connect timeout of `timeout`
    pub fn new(timeout: &Timeout, user_agent: &str) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(connect) = timeout.connect {
            builder = builder.connect_timeout(connect);
        }
        let client = builder
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Default transport over reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    session: Option<Session>,
    timeout: Timeout,
    user_agent: String,
}

impl HttpTransport {
    /// Transport that builds a new client for every request
    pub fn one_shot(timeout: Timeout) -> Self {
        Self {
            session: None,
            timeout,
            user_agent: default_user_agent(),
        }
    }

    /// Transport that dispatches through `session`
    pub fn with_session(session: Session, timeout: Timeout) -> Self {
        Self {
            session: Some(session),
            timeout,
            user_agent: default_user_agent(),
        }
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Check if requests reuse a session
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn timeout(&self) -> &Timeout {
        &self.timeout
    }

    fn client(&self) -> Result<Client> {
        match &self.session {
            Some(session) => Ok(session.client.clone()),
            None => Ok(Session::new(&self.timeout, &self.user_agent)?.client),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::one_shot(Timeout::none())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<TransportResponse> {
        let client = self.client()?;
        let mut req = client.request(method.into(), url);

        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        if let Some(ref body) = config.body {
            req = req.json(body);
        }

        let read_timeout = config.timeout.or(self.timeout.read);
        if let Some(limit) = read_timeout {
            req = req.timeout(limit);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: fired_limit(
                        e.is_connect(),
                        self.timeout.connect,
                        read_timeout,
                    ),
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("{} {} -> {}", method, url, status);

        Ok(TransportResponse::new(status, body))
    }

    fn open_session(&self) -> Result<Option<Box<dyn Transport>>> {
        if self.has_session() {
            return Ok(None);
        }
        let session = Session::new(&self.timeout, &self.user_agent)?;
        let transport = Self {
            session: Some(session),
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
        };
        Ok(Some(Box::new(transport)))
    }
}

/// The limit, in milliseconds, behind a timeout; `None` when no such limit was set
fn fired_limit(
    during_connect: bool,
    connect: Option<Duration>,
    read: Option<Duration>,
) -> Option<u64> {
    let limit = if during_connect { connect } else { read };
    limit.map(|t| t.as_millis() as u64)
}

fn default_user_agent() -> String {
    format!("airtable-client/{}", env!("CARGO_PKG_VERSION"))
}
