//! Walks every page of the remote catalog.
//!
//! Each request uses the cursor from the page fetched immediately before it.
//! Cursors are never stored beyond one walk.

use std::pin::pin;

use futures::{Stream, TryStreamExt, stream};

use crate::{
    catalog::{CatalogError, CatalogItem, CatalogReader, CatalogResult, Page},
    config::CatalogConfig,
    observability::metrics,
};

/// Page size and page cap for one enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationLimits {
    pub page_size: u32,
    /// Hard cap against runaway pagination.
    pub max_pages: u32,
}

impl Default for EnumerationLimits {
    fn default() -> Self {
        Self {
            page_size: crate::config::MAX_PAGE_SIZE,
            max_pages: 40,
        }
    }
}

impl From<&CatalogConfig> for EnumerationLimits {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_pages: config.max_pages,
        }
    }
}

/// Everything one enumeration saw.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub items: Vec<CatalogItem>,
    pub pages_fetched: u32,
    /// The page cap stopped the walk while the remote still had pages.
    pub truncated: bool,
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazily fetch pages, at most `max_pages` of them.
///
/// The stream ends after the first page without a next cursor, after
/// `max_pages` pages, or after yielding the first error.
pub fn pages<R>(
    reader: &R,
    page_size: u32,
    max_pages: u32,
) -> impl Stream<Item = CatalogResult<Page>> + '_
where
    R: CatalogReader + ?Sized,
{
    stream::try_unfold((Cursor::Start, 0u32), move |(cursor, fetched)| async move {
        let cursor = match cursor {
            Cursor::Done => return Ok::<_, CatalogError>(None),
            _ if fetched >= max_pages => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(c) => Some(c),
        };

        let page = reader.list_page(cursor.as_deref(), page_size).await?;
        metrics::record_page_fetched();

        let next = match &page.next_cursor {
            Some(c) => Cursor::Next(c.clone()),
            None => Cursor::Done,
        };
        Ok(Some((page, (next, fetched + 1))))
    })
}

/// Fetch the complete listing.
///
/// Fails on the first page error; a partial listing is never returned.
pub async fn enumerate_all<R>(
    reader: &R,
    page_size: u32,
    max_pages: u32,
) -> CatalogResult<Listing>
where
    R: CatalogReader + ?Sized,
{
    let mut page_stream = pin!(pages(reader, page_size, max_pages));
    let mut listing = Listing::default();
    let mut has_more = false;

    while let Some(page) = page_stream.try_next().await? {
        listing.pages_fetched += 1;
        has_more = page.next_cursor.is_some();
        listing.items.extend(page.items);
    }

    listing.truncated = has_more;
    if listing.truncated {
        tracing::warn!(
            max_pages,
            items = listing.items.len(),
            "Page cap reached before the end of the catalog; listing is incomplete"
        );
    } else {
        tracing::debug!(
            pages = listing.pages_fetched,
            items = listing.items.len(),
            "Catalog enumeration complete"
        );
    }

    Ok(listing)
}
