//! Azure retail price lookup tool.
//!
//! Queries the Azure Retail Prices API with an OData filter expression and
//! walks up to three pages of results.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::domains::tools::context::{ToolContext, USER_AGENT};
use crate::domains::tools::definitions::common::field;
use crate::domains::tools::descriptor::{ParamSpec, ParamType, ToolDescriptor};
use crate::domains::upstream::{FetchFailure, PageLayout, PageSet, Paginator, UpstreamRequest};

/// API version sent with every query.
pub const API_VERSION: &str = "2023-01-01-preview";

/// Page cap; larger result sets are reported as truncated.
pub const MAX_PAGES: usize = 3;

/// Timeout for each page request.
pub const PRICE_TIMEOUT: Duration = Duration::from_secs(10);

const LAYOUT: PageLayout = PageLayout::new("Items", "NextPageLink");

/// Bytes left unescaped in `$filter`: unreserved characters and `/`.
const FILTER_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Parameters for price lookups.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AzurePriceParams {
    /// OData filter expression. Example: contains(armSkuName, 'Standard_D2_v3') and contains(armRegionName, 'eastus')
    pub filter_expression: String,
}

/// Azure price tool implementation.
#[derive(Debug, Clone)]
pub struct AzurePriceTool;

impl AzurePriceTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_azure_price";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Get Azure price for a service using OData filter expressions.";

    pub const NO_RESULTS: &'static str =
        "Unable to fetch Azure price data for this filter expression or no results found.";

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<AzurePriceParams>(Self::NAME, Self::DESCRIPTION)
            .param(ParamSpec::required("filter_expression", ParamType::String))
    }

    #[instrument(skip_all, fields(filter = %params.filter_expression))]
    pub async fn execute(params: &AzurePriceParams, ctx: &ToolContext) -> String {
        info!("Fetching Azure prices for filter: {}", params.filter_expression);

        let request = Self::initial_request(&ctx.endpoints.azure_price_base, &params.filter_expression);
        let pages = Paginator::new(&ctx.fetcher, LAYOUT)
            .paginate(request, MAX_PAGES)
            .await;

        if let Some((url, failure)) = &pages.halted {
            log_failure(url, failure);
        }

        Self::format(&pages)
    }

    /// First page request: filter percent-encoded into `$filter`.
    pub fn initial_request(base: &str, filter_expression: &str) -> UpstreamRequest {
        let encoded = utf8_percent_encode(filter_expression, FILTER_ENCODE);
        let url = format!("{base}?api-version={API_VERSION}&$filter={encoded}");

        UpstreamRequest::get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .timeout(PRICE_TIMEOUT)
    }

    fn format(pages: &PageSet) -> String {
        if pages.items.is_empty() {
            return Self::NO_RESULTS.to_string();
        }

        let count = pages.items.len();
        let summary = if pages.truncated {
            format!("Found {count} pricing items (limited to {MAX_PAGES} pages)")
        } else {
            format!("Found {count} pricing items (showing all)")
        };

        let prices: Vec<String> = pages.items.iter().map(format_item).collect();
        format!("{summary}\n\n{}", prices.join("\n\n---\n\n"))
    }
}

fn format_item(item: &Value) -> String {
    let mut lines = Vec::new();
    if let Some(product) = field(item, "productName") {
        lines.push(format!("Product: {product}"));
    }
    if let Some(sku) = field(item, "skuName") {
        lines.push(format!("SKU: {sku}"));
    }
    if let Some(price) = field(item, "retailPrice") {
        lines.push(format!("Price: {price} USD"));
    }
    if let Some(unit) = field(item, "unitOfMeasure") {
        lines.push(format!("Per: {unit}"));
    }
    if let Some(region) = field(item, "armRegionName") {
        lines.push(format!("Region: {region}"));
    }
    lines.join("\n")
}

fn log_failure(url: &str, failure: &FetchFailure) {
    match failure {
        FetchFailure::Timeout => warn!("Timeout while fetching Azure price data from {}", url),
        FetchFailure::Status { status, body } => error!(
            "HTTP error {} while fetching Azure price data: {}",
            status, body
        ),
        other => error!("Error fetching Azure price data: {}", other),
    }
}
