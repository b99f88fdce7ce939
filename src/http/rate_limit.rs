//! Rate limiting implementation
//!
//! Uses the governor crate for token bucket rate limiting. Throttling only
//! delays requests; nothing here retries.

use super::request::{RequestConfig, TransportResponse};
use super::transport::Transport;
use crate::error::{Error, Result};
use crate::types::Method;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    /// Airtable allows five requests per second per base
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_size: 5,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait with a timeout
    pub async fn wait_with_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.limiter.until_ready())
            .await
            .is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

/// Transport wrapper that waits for a rate limiter permit before each send
///
/// A request carrying its own timeout waits at most that long for a permit
/// and fails with [`Error::Timeout`] otherwise.
#[derive(Debug, Clone)]
pub struct ThrottledTransport<T> {
    inner: T,
    limiter: RateLimiter,
}

impl<T: Transport> ThrottledTransport<T> {
    pub fn new(inner: T, config: &RateLimiterConfig) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(config),
        }
    }

    /// Share an existing limiter, so several transports draw from one bucket
    pub fn with_limiter(inner: T, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for ThrottledTransport<T> {
    async fn send(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<TransportResponse> {
        if !self.limiter.try_acquire() {
            debug!("Throttling {} {}", method, url);
            match config.timeout {
                Some(limit) => {
                    if !self.limiter.wait_with_timeout(limit).await {
                        return Err(Error::Timeout {
                            timeout_ms: Some(limit.as_millis() as u64),
                        });
                    }
                }
                None => self.limiter.wait().await,
            }
        }
        self.inner.send(method, url, config).await
    }

    fn open_session(&self) -> Result<Option<Box<dyn Transport>>> {
        let limiter = self.limiter.clone();
        Ok(self.inner.open_session()?.map(|session| {
            Box::new(ThrottledTransport::with_limiter(session, limiter)) as Box<dyn Transport>
        }))
    }
}
