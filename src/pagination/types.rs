//! Pagination types
//!
//! Defines list parameters, pages, and the state tracked while paginating.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of processing a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available at this cursor
    Continue {
        /// Opaque cursor to send as `offset`
        cursor: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// One page of a list response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Records in arrival order
    pub records: Vec<Value>,
    /// Cursor for the next page; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl Page {
    /// Whether another page follows
    pub fn has_more(&self) -> bool {
        self.offset.is_some()
    }
}

/// Query parameters for list calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Limit on the total number of records returned (`maxRecords`)
    pub max_records: Option<u32>,
    /// Cursor to start from (`offset`)
    pub offset: Option<String>,
    /// Filter formula (`filterByFormula`)
    pub filter_by_formula: Option<String>,
    /// Columns to return (`fields`, repeated)
    pub fields: Vec<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_records(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Query pairs for a request at `cursor` (overrides `self.offset`)
    pub fn to_query(&self, cursor: Option<&str>) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(max) = self.max_records {
            query.push(("maxRecords".to_string(), max.to_string()));
        }
        if let Some(cursor) = cursor.or(self.offset.as_deref()) {
            query.push(("offset".to_string(), cursor.to_string()));
        }
        if let Some(formula) = &self.filter_by_formula {
            query.push(("filterByFormula".to_string(), formula.clone()));
        }
        for field in &self.fields {
            query.push(("fields".to_string(), field.clone()));
        }
        query
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Cursor for the next request
    pub cursor: Option<String>,
    /// Pages received so far
    pub pages: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state starting at a known cursor
    pub fn starting_at(cursor: Option<String>) -> Self {
        Self {
            cursor,
            ..Default::default()
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
        self.cursor = None;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }

    /// Record a received page
    pub fn add_page(&mut self, records: usize) {
        self.pages += 1;
        self.total_fetched += records as u64;
    }
}
