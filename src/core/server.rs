//! MCP Server implementation and lifecycle management.
//!
//! `McpServer` owns the tool registry shared by both transports. Over STDIO it
//! is the rmcp `ServerHandler`; over SSE it supplies the registry and identity
//! to the session gateway.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/`, one file per tool, and
//! registered in `domains/tools/registry.rs`. The rmcp `ToolRouter` is built
//! from the registry in `domains/tools/router.rs`.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;

use super::config::Config;
use super::gateway::ServerIdentity;
use crate::domains::tools::{ToolContext, ToolRegistry, build_tool_router};

/// Instructions sent to clients during the handshake.
pub const INSTRUCTIONS: &str = "Weather alerts and forecasts for US locations (National Weather \
     Service), Azure retail price lookups, and Chinese character counting.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tools available to clients.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls over rmcp.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the built-in tools.
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, ToolRegistry::new(ToolContext::default()))
    }

    /// Create a server around an existing registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        let registry = Arc::new(registry);
        Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            config: Arc::new(config),
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Identity reported to SSE clients during the handshake.
    pub fn identity(&self) -> ServerIdentity {
        ServerIdentity {
            name: self.name().to_string(),
            version: self.version().to_string(),
            instructions: INSTRUCTIONS.to_string(),
        }
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
