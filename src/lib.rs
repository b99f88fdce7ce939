// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # Airtable Client
//!
//! An async client for the Airtable REST API.
//!
//! ## Features
//!
//! - **URL Construction**: Table and record URLs with base/record ID validation
//! - **Pagination**: Follows the `offset` cursor until a listing is exhausted
//! - **Batched Writes**: Tabular data is chunked to the API's 10-record limit
//! - **Formula Builder**: Escaped literals, column references, and date ranges
//! - **Pluggable Transport**: reqwest by default, or any [`http::Transport`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use airtable_client::{AirtableClient, ClientConfig, ListParams, Result};
//! use airtable_client::formula::date_range_filter;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Token is read from AIRTABLE_AUTH_TOKEN
//!     let client = AirtableClient::new(&ClientConfig::default())?;
//!     let url = client.construct_url("appXXXXXXXXXXXXXX", "Tasks", None)?;
//!
//!     let filter = date_range_filter(Some("Due"), Some("2024-01-01"), None, "day")?;
//!     let records = client.get(&url, &ListParams::new().filter(filter)).await?;
//!
//!     let row = serde_json::json!({"Name": "Write docs"});
//!     client.push(&url, row.as_object().cloned().unwrap_or_default(), true).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       AirtableClient                         │
//! │  construct_url  fetch  get  push  update  replace  delete    │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬───────────┬──────┴───────┬────────────┬──────────┐
//! │   ids    │ endpoint  │  pagination  │   codec    │ formula  │
//! ├──────────┼───────────┼──────────────┼────────────┼──────────┤
//! │ key/app/ │ base/table│ offset       │ rows →     │ {col}    │
//! │ rec      │ /record   │ cursor loop  │ envelopes  │ 'value'  │
//! └──────────┴───────────┴──────────────┴────────────┴──────────┘
//!                               │
//! ┌──────────────────────────────────────────────────────────────┐
//! │              http::Transport (reqwest, governor)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Identifier validation
pub mod ids;

/// Tabular data to upload envelopes
pub mod codec;

/// Filter formula construction
pub mod formula;

/// API URL construction
pub mod endpoint;

/// HTTP transport with optional rate limiting
pub mod http;

/// Cursor pagination
pub mod pagination;

/// Client configuration
pub mod config;

/// High-level client
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::AirtableClient;
pub use codec::{TabularInput, UploadData, UploadEnvelope};
pub use config::ClientConfig;
pub use ids::{IdKind, Identifier};
pub use pagination::ListParams;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
