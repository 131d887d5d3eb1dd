//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are named functions that MCP clients invoke; each one calls an
//! upstream HTTP service and answers with text.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `descriptor.rs` - Declared parameters and argument validation
//! - `registry.rs` - Name → handler table and dispatch
//! - `router.rs` - rmcp ToolRouter for the stdio transport
//! - `invocation.rs` - Transport-neutral request/result types
//! - `context.rs` - Upstream fetcher and endpoints handed to handlers
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with `descriptor()` and `execute()`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add a `ToolHandler` variant and register it in `ToolRegistry::new`
//!
//! Both transports pick it up from the registry.

pub mod context;
pub mod definitions;
pub mod descriptor;
mod error;
pub mod invocation;
mod registry;
pub mod router;

pub use context::{ToolContext, UpstreamEndpoints};
pub use descriptor::{ParamSpec, ParamType, ToolDescriptor, ValidatedArgs};
pub use error::ToolError;
pub use invocation::{InvocationRequest, InvocationResult, ToolOutcome};
pub use registry::{RegisteredTool, ToolHandler, ToolRegistry};
pub use router::build_tool_router;
