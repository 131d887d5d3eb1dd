//! Chinese character count tool.
//!
//! Delegates the count to an external function and reports its answer
//! verbatim.

use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::domains::tools::context::ToolContext;
use crate::domains::tools::descriptor::{ParamSpec, ParamType, ToolDescriptor};
use crate::domains::upstream::{FetchFailure, UpstreamRequest, UpstreamResponse};

/// Timeout for the counting service.
pub const CHAR_COUNT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CharCountParams {
    /// The input text string containing Chinese characters
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct CharCountTool;

impl CharCountTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "count_chinese_characters";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Count the number of Chinese characters in a string. Use when the user asks about the word count.";

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<CharCountParams>(Self::NAME, Self::DESCRIPTION)
            .param(ParamSpec::required("text", ParamType::String))
    }

    #[instrument(skip_all, fields(bytes = params.text.len()))]
    pub async fn execute(params: &CharCountParams, ctx: &ToolContext) -> String {
        info!("Counting Chinese characters ({} bytes)", params.text.len());

        let url = match url::Url::parse_with_params(
            &ctx.endpoints.char_count_url,
            [("text", params.text.as_str())],
        ) {
            Ok(url) => url,
            Err(e) => return failure_text(&FetchFailure::Transport(e.to_string())),
        };

        let request = UpstreamRequest::get(url.as_str()).timeout(CHAR_COUNT_TIMEOUT);
        match ctx.fetcher.fetch_text(&request).await {
            UpstreamResponse::Present(count) => format!("Chinese character count: {count}"),
            UpstreamResponse::Absent(failure) => {
                warn!("Character count failed: {}", failure);
                failure_text(&failure)
            }
        }
    }
}

fn failure_text(failure: &FetchFailure) -> String {
    format!("Error counting Chinese characters: {failure}")
}
