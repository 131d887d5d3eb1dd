//! Cloud pricing tools.

pub mod azure_price;

pub use azure_price::{AzurePriceParams, AzurePriceTool};
