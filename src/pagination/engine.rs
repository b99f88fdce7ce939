//! Page fetching loop

use super::cursor::OffsetCursor;
use super::types::{ListParams, Page, PaginationState};
use crate::error::Result;
use crate::http::{RequestConfig, Transport};
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use tracing::debug;

/// Fetch a single page at `cursor`
///
/// `defaults` supplies headers and timeout; list parameters are appended to
/// its query.
pub async fn fetch_page<T>(
    transport: &T,
    url: &str,
    params: &ListParams,
    cursor: Option<&str>,
    defaults: &RequestConfig,
) -> Result<Page>
where
    T: Transport + ?Sized,
{
    let mut config = defaults.clone();
    config.query.extend(params.to_query(cursor));

    let response = transport.get(url, config).await?;
    response.json::<Page>()
}

/// Stream pages in order, following the cursor until it runs out
///
/// The stream ends after the first error.
pub fn pages<'a, T>(
    transport: &'a T,
    url: &'a str,
    params: &'a ListParams,
    defaults: &'a RequestConfig,
) -> impl Stream<Item = Result<Page>> + Send + 'a
where
    T: Transport + ?Sized,
{
    let paginator = OffsetCursor;
    let initial = PaginationState::starting_at(params.offset.clone());

    stream::try_unfold(initial, move |mut state| async move {
        if state.done {
            return Ok(None);
        }

        let page = fetch_page(transport, url, params, state.cursor.as_deref(), defaults).await?;
        let next = paginator.process_page(&page, &mut state);
        debug!(
            "Page {}: fetched {} records ({} total), {}",
            state.pages,
            page.records.len(),
            state.total_fetched,
            if next.is_done() { "done" } else { "more" }
        );

        Ok(Some((page, state)))
    })
}

/// Fetch every record reachable from `url`, in arrival order
///
/// Any failed page aborts the whole listing; records from earlier pages are
/// dropped, since cursors are not guaranteed to survive a failure.
pub async fn list_all<T>(
    transport: &T,
    url: &str,
    params: &ListParams,
    defaults: &RequestConfig,
) -> Result<Vec<Value>>
where
    T: Transport + ?Sized,
{
    let stream = pages(transport, url, params, defaults);
    futures::pin_mut!(stream);

    let mut records = Vec::new();
    while let Some(page) = stream.try_next().await? {
        records.extend(page.records);
    }

    Ok(records)
}
