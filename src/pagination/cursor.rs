//! Offset cursor strategy
//!
//! Airtable's cursor lives in the `offset` field of each page and is sent
//! back as the `offset` query parameter.

use super::types::{NextPage, Page, PaginationState};

/// Cursor pagination keyed on the `offset` field
///
/// Only a missing cursor ends pagination. An empty page that still carries a
/// cursor continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetCursor;

impl OffsetCursor {
    /// Process a page and determine if there's a next page
    pub fn process_page(&self, page: &Page, state: &mut PaginationState) -> NextPage {
        state.add_page(page.records.len());

        match &page.offset {
            Some(cursor) => {
                state.set_cursor(cursor.clone());
                NextPage::Continue {
                    cursor: cursor.clone(),
                }
            }
            None => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}
