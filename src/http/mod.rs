//! HTTP transport module
//!
//! The narrow seam between the client and the network.
//!
//! # Features
//!
//! - **Transport trait**: Verb-named calls (`get`, `post`, `patch`, `put`, `delete`)
//!   that any HTTP stack can implement
//! - **Sessions**: Reuse one connection pool across paginated or batched calls,
//!   or fall back to a one-shot client per request
//! - **Throttling**: Optional token bucket wrapper using governor
//!
//! Transports never interpret status codes; callers decide what a non-2xx
//! response means.

mod rate_limit;
mod request;
mod transport;

pub use rate_limit::{RateLimiter, RateLimiterConfig, ThrottledTransport};
pub use request::{RequestConfig, Timeout, TransportResponse};
pub use transport::{HttpTransport, Session, Transport};
