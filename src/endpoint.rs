//! API URL construction

use crate::error::Result;
use crate::ids::{self, IdKind};

/// Build `<api_root>/<base_id>/<table_id>[/<record_id>]`
///
/// `base_id` and `record_id` are validated; `table_id` may be a table name or
/// ID and is used verbatim.
pub fn build_url(
    api_root: &str,
    base_id: &str,
    table_id: &str,
    record_id: Option<&str>,
) -> Result<String> {
    ids::validate(base_id, IdKind::BaseId)?;

    let root = api_root.trim_end_matches('/');
    match record_id {
        Some(record_id) => {
            ids::validate(record_id, IdKind::RecordId)?;
            Ok(format!("{root}/{base_id}/{table_id}/{record_id}"))
        }
        None => Ok(format!("{root}/{base_id}/{table_id}")),
    }
}

/// Append `record_id` as the last path segment of `url`
pub fn record_url(url: &str, record_id: &str) -> Result<String> {
    ids::validate(record_id, IdKind::RecordId)?;
    Ok(format!("{}/{record_id}", url.trim_end_matches('/')))
}
