//! Collaborators handed to every tool handler.

use crate::domains::upstream::UpstreamFetcher;

/// National Weather Service API.
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Azure Retail Prices API.
pub const AZURE_PRICE_API_BASE: &str = "https://prices.azure.com/api/retail/prices";

/// Chinese character counting function.
pub const CHAR_COUNT_URL: &str = "https://haxufunctions.azurewebsites.net/api/http_trigger";

/// User agent sent to every upstream.
pub const USER_AGENT: &str = "weather-app/1.0";

/// Base URLs of the upstream services.
///
/// These are fixed policy values in production; tests point them at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEndpoints {
    pub nws_base: String,
    pub azure_price_base: String,
    pub char_count_url: String,
}

impl Default for UpstreamEndpoints {
    fn default() -> Self {
        Self {
            nws_base: NWS_API_BASE.to_string(),
            azure_price_base: AZURE_PRICE_API_BASE.to_string(),
            char_count_url: CHAR_COUNT_URL.to_string(),
        }
    }
}

impl UpstreamEndpoints {
    /// Every service rooted at `base`, using the production paths.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            nws_base: base.to_string(),
            azure_price_base: format!("{base}/api/retail/prices"),
            char_count_url: format!("{base}/api/http_trigger"),
        }
    }
}

/// Fetcher and endpoints shared by all handlers.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub fetcher: UpstreamFetcher,
    pub endpoints: UpstreamEndpoints,
}

impl ToolContext {
    pub fn new(fetcher: UpstreamFetcher, endpoints: UpstreamEndpoints) -> Self {
        Self { fetcher, endpoints }
    }

    pub fn with_endpoints(endpoints: UpstreamEndpoints) -> Self {
        Self::new(UpstreamFetcher::new(), endpoints)
    }
}
