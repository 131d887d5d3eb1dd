//! Weather forecast tool.
//!
//! Resolves a coordinate pair to its NWS forecast endpoint, then formats the
//! next few forecast periods.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::alerts::nws_request;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::common::{RECORD_SEPARATOR, field_or};
use crate::domains::tools::descriptor::{ParamSpec, ParamType, ToolDescriptor};
use crate::domains::upstream::UpstreamResponse;

/// Only this many periods are shown.
pub const FORECAST_PERIODS: usize = 5;

/// Parameters for forecast lookups.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ForecastParams {
    /// Latitude of the location
    pub latitude: f64,
    /// Longitude of the location
    pub longitude: f64,
}

/// Weather forecast tool implementation.
#[derive(Debug, Clone)]
pub struct ForecastTool;

impl ForecastTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_forecast";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get weather forecast for a location.";

    pub const POINTS_FAILED: &'static str = "Unable to fetch forecast data for this location.";
    pub const FORECAST_FAILED: &'static str = "Unable to fetch detailed forecast.";

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<ForecastParams>(Self::NAME, Self::DESCRIPTION)
            .param(ParamSpec::required("latitude", ParamType::Float))
            .param(ParamSpec::required("longitude", ParamType::Float))
    }

    #[instrument(skip_all, fields(latitude = params.latitude, longitude = params.longitude))]
    pub async fn execute(params: &ForecastParams, ctx: &ToolContext) -> String {
        info!(
            "Fetching forecast for {},{}",
            params.latitude, params.longitude
        );

        let points_url = format!(
            "{}/points/{},{}",
            ctx.endpoints.nws_base,
            coordinate(params.latitude),
            coordinate(params.longitude)
        );

        let forecast_url = match ctx.fetcher.fetch(&nws_request(points_url)).await {
            UpstreamResponse::Present(points) => points
                .pointer("/properties/forecast")
                .and_then(Value::as_str)
                .map(str::to_string),
            UpstreamResponse::Absent(failure) => {
                warn!("Points lookup failed: {}", failure);
                None
            }
        };

        let Some(forecast_url) = forecast_url else {
            return Self::POINTS_FAILED.to_string();
        };

        let forecast = match ctx.fetcher.fetch(&nws_request(forecast_url)).await {
            UpstreamResponse::Present(forecast) => forecast,
            UpstreamResponse::Absent(failure) => {
                warn!("Forecast fetch failed: {}", failure);
                return Self::FORECAST_FAILED.to_string();
            }
        };

        let Some(periods) = forecast
            .pointer("/properties/periods")
            .and_then(Value::as_array)
        else {
            return Self::FORECAST_FAILED.to_string();
        };

        periods
            .iter()
            .take(FORECAST_PERIODS)
            .map(format_period)
            .collect::<Vec<_>>()
            .join(RECORD_SEPARATOR)
    }
}

/// Coordinate as written in the points path. Whole degrees keep their
/// fractional part (`39.0`, not `39`).
fn coordinate(value: f64) -> String {
    format!("{value:?}")
}

fn format_period(period: &Value) -> String {
    format!(
        "\n{}:\nTemperature: {}°{}\nWind: {} {}\nForecast: {}\n",
        field_or(period, "name", "Unknown"),
        field_or(period, "temperature", "Unknown"),
        field_or(period, "temperatureUnit", ""),
        field_or(period, "windSpeed", "Unknown"),
        field_or(period, "windDirection", ""),
        field_or(period, "detailedForecast", "Unknown"),
    )
}
