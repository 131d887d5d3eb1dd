//! Upstream domain module.
//!
//! Outbound HTTP used by the tools:
//! - `fetcher.rs` - one GET with timeout, failures folded into an absent marker
//! - `paginator.rs` - bounded cursor-following over the fetcher

mod fetcher;
mod paginator;

pub use fetcher::{FetchFailure, UpstreamFetcher, UpstreamRequest, UpstreamResponse};
pub use paginator::{DEFAULT_MAX_PAGES, PageLayout, PageSet, Paginator};
