//! Pagination module
//!
//! Drives Airtable's cursor-based listing.
//!
//! # Overview
//!
//! A list call returns `{records, offset?}`. The `offset` is an opaque cursor
//! for the next page; when it is absent the listing is exhausted. Pages are
//! requested strictly one after another because each request depends on the
//! cursor returned by the previous one.

mod cursor;
mod engine;
mod types;

pub use cursor::OffsetCursor;
pub use engine::{fetch_page, list_all, pages};
pub use types::{ListParams, NextPage, Page, PaginationState};
