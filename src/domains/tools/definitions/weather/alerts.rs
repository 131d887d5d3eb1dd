//! Weather alerts tool.
//!
//! Looks up the active National Weather Service alerts for a US state.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::domains::tools::context::{ToolContext, USER_AGENT};
use crate::domains::tools::definitions::common::{RECORD_SEPARATOR, field_or};
use crate::domains::tools::descriptor::{ParamSpec, ParamType, ToolDescriptor};
use crate::domains::upstream::{UpstreamRequest, UpstreamResponse};

/// Timeout for NWS requests.
pub const NWS_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters for alert lookups.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AlertsParams {
    /// Two-letter US state code (e.g. CA, NY)
    pub state: String,
}

/// Weather alerts tool implementation.
#[derive(Debug, Clone)]
pub struct AlertsTool;

impl AlertsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_alerts";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get weather alerts for a US state.";

    pub const FETCH_FAILED: &'static str = "Unable to fetch alerts or no alerts found.";
    pub const NO_ALERTS: &'static str = "No active alerts for this state.";

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<AlertsParams>(Self::NAME, Self::DESCRIPTION)
            .param(ParamSpec::required("state", ParamType::String))
    }

    /// Fetch and format the active alerts.
    #[instrument(skip_all, fields(state = %params.state))]
    pub async fn execute(params: &AlertsParams, ctx: &ToolContext) -> String {
        info!("Fetching alerts for state: {}", params.state);

        let url = format!("{}/alerts/active/area/{}", ctx.endpoints.nws_base, params.state);
        let data = match ctx.fetcher.fetch(&nws_request(url)).await {
            UpstreamResponse::Present(data) => data,
            UpstreamResponse::Absent(failure) => {
                warn!("Alerts fetch for {} failed: {}", params.state, failure);
                return Self::FETCH_FAILED.to_string();
            }
        };

        let Some(features) = data.get("features").and_then(Value::as_array) else {
            return Self::FETCH_FAILED.to_string();
        };

        if features.is_empty() {
            return Self::NO_ALERTS.to_string();
        }

        features
            .iter()
            .map(format_alert)
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
    }
}

/// GET request with the headers the NWS API expects.
pub fn nws_request(url: String) -> UpstreamRequest {
    UpstreamRequest::get(url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/geo+json")
        .timeout(NWS_TIMEOUT)
}

/// Format one alert feature.
fn format_alert(feature: &Value) -> String {
    let props = feature.get("properties").unwrap_or(&Value::Null);
    format!(
        "\nEvent: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        field_or(props, "event", "Unknown"),
        field_or(props, "areaDesc", "Unknown"),
        field_or(props, "severity", "Unknown"),
        field_or(props, "description", "No description available"),
        field_or(props, "instruction", "No specific instructions provided"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::context::UpstreamEndpoints;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(state: &str) -> AlertsParams {
        AlertsParams {
            state: state.to_string(),
        }
    }

    fn context(server: &MockServer) -> ToolContext {
        ToolContext::with_endpoints(UpstreamEndpoints::rooted_at(&server.uri()))
    }

    #[tokio::test]
    async fn test_no_active_alerts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/alerts/active/area/CA"))
            .and(header("Accept", "application/geo+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
            .mount(&server)
            .await;

        let text = AlertsTool::execute(&params("CA"), &context(&server)).await;
        assert_eq!(text, "No active alerts for this state.");
    }

    #[tokio::test]
    async fn test_fetch_failure_message() {
        let server = MockServer::start().await;
        Mock::given(path("/alerts/active/area/ZZ"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let text = AlertsTool::execute(&params("ZZ"), &context(&server)).await;
        assert_eq!(text, "Unable to fetch alerts or no alerts found.");
    }

    #[tokio::test]
    async fn test_missing_features_is_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(path("/alerts/active/area/TX"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "x" })))
            .mount(&server)
            .await;

        let text = AlertsTool::execute(&params("TX"), &context(&server)).await;
        assert_eq!(text, AlertsTool::FETCH_FAILED);
    }

    #[tokio::test]
    async fn test_formats_alerts_and_is_repeatable() {
        let server = MockServer::start().await;
        Mock::given(path("/alerts/active/area/NY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [
                    { "properties": {
                        "event": "Flood Warning",
                        "areaDesc": "Kings County",
                        "severity": "Severe",
                        "description": "River rising.",
                        "instruction": "Move to higher ground."
                    } },
                    { "properties": { "event": "Wind Advisory" } }
                ]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let ctx = context(&server);
        let first = AlertsTool::execute(&params("NY"), &ctx).await;
        let second = AlertsTool::execute(&params("NY"), &ctx).await;

        let expected = "\nEvent: Flood Warning\nArea: Kings County\nSeverity: Severe\n\
                        Description: River rising.\nInstructions: Move to higher ground.\n\
                        \n---\n\
                        \nEvent: Wind Advisory\nArea: Unknown\nSeverity: Unknown\n\
                        Description: No description available\n\
                        Instructions: No specific instructions provided\n";
        assert_eq!(first, expected);
        assert_eq!(first, second);
    }
}
