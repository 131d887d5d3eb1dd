//! Cursor-following pagination over the upstream fetcher.

use serde_json::Value;
use tracing::debug;

use super::fetcher::{FetchFailure, UpstreamFetcher, UpstreamRequest, UpstreamResponse};

/// Page limit used when a caller has no better value.
pub const DEFAULT_MAX_PAGES: usize = 3;

/// Where a paginated upstream keeps its items and its next-page cursor.
#[derive(Debug, Clone, Copy)]
pub struct PageLayout {
    /// Field holding the array of items on each page.
    pub items_field: &'static str,
    /// Field holding the absolute URL of the next page.
    pub next_field: &'static str,
}

impl PageLayout {
    pub const fn new(items_field: &'static str, next_field: &'static str) -> Self {
        Self {
            items_field,
            next_field,
        }
    }

    fn items(&self, page: &Value) -> Vec<Value> {
        page.get(self.items_field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    fn cursor(&self, page: &Value) -> Option<String> {
        page.get(self.next_field)
            .and_then(Value::as_str)
            .filter(|next| !next.is_empty())
            .map(str::to_string)
    }
}

/// Items collected across pages.
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    pub items: Vec<Value>,
    /// Number of fetches attempted, failed ones included.
    pub page_count: usize,
    /// True iff the page cap was reached while a next cursor still existed.
    pub truncated: bool,
    /// URL and reason of the fetch that stopped pagination early.
    pub halted: Option<(String, FetchFailure)>,
}

/// Drives an [`UpstreamFetcher`] across pages.
#[derive(Debug, Clone)]
pub struct Paginator<'a> {
    fetcher: &'a UpstreamFetcher,
    layout: PageLayout,
}

impl<'a> Paginator<'a> {
    pub fn new(fetcher: &'a UpstreamFetcher, layout: PageLayout) -> Self {
        Self { fetcher, layout }
    }

    /// Fetch up to `max_pages` pages starting at `initial`.
    ///
    /// A failed fetch ends the walk; what was collected before it is kept.
    /// Later pages reuse the headers and timeout of `initial`.
    pub async fn paginate(&self, initial: UpstreamRequest, max_pages: usize) -> PageSet {
        let mut set = PageSet::default();
        let mut cursor = Some(initial.url.clone());

        while let Some(url) = cursor.take() {
            if set.page_count == max_pages {
                cursor = Some(url);
                break;
            }

            set.page_count += 1;
            let request = initial.with_url(url.as_str());

            let page = match self.fetcher.fetch(&request).await {
                UpstreamResponse::Present(page) => page,
                UpstreamResponse::Absent(failure) => {
                    debug!(page = set.page_count, %url, %failure, "Pagination halted");
                    set.halted = Some((url, failure));
                    break;
                }
            };

            set.items.extend(self.layout.items(&page));
            cursor = self.layout.cursor(&page);
        }

        set.truncated = cursor.is_some();
        set
    }
}
