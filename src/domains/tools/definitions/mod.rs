//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod common;
pub mod pricing;
pub mod text;
pub mod weather;

pub use pricing::{AzurePriceParams, AzurePriceTool};
pub use text::{CharCountParams, CharCountTool};
pub use weather::{AlertsParams, AlertsTool, ForecastParams, ForecastTool};
