//! National Weather Service tools:
//! - `alerts`: active alerts for a US state
//! - `forecast`: next forecast periods for a coordinate pair

pub mod alerts;
pub mod forecast;

pub use alerts::{AlertsParams, AlertsTool};
pub use forecast::{ForecastParams, ForecastTool};
