//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - The closed set of tool handlers
//! - A registry mapping tool names to descriptors and handlers
//! - Validation and dispatch of invocations
//!
//! The registry is filled at startup and then shared behind an `Arc`; nothing
//! mutates it while requests are served.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::context::ToolContext;
use super::definitions::{AlertsTool, AzurePriceTool, CharCountTool, ForecastTool};
use super::descriptor::{ToolDescriptor, ValidatedArgs};
use super::error::ToolError;
use super::invocation::{InvocationRequest, InvocationResult};

// ============================================================================
// Tool Handlers
// ============================================================================

/// Every tool the server can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolHandler {
    Alerts,
    Forecast,
    AzurePrice,
    CharCount,
}

impl ToolHandler {
    /// Run the tool. Only argument decoding can fail; upstream trouble is
    /// reported inside the returned text.
    pub async fn invoke(self, args: &ValidatedArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let text = match self {
            Self::Alerts => AlertsTool::execute(&args.parse()?, ctx).await,
            Self::Forecast => ForecastTool::execute(&args.parse()?, ctx).await,
            Self::AzurePrice => AzurePriceTool::execute(&args.parse()?, ctx).await,
            Self::CharCount => CharCountTool::execute(&args.parse()?, ctx).await,
        };
        Ok(text)
    }
}

/// A registered tool.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub handler: ToolHandler,
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<&'static str, usize>,
    context: ToolContext,
}

impl ToolRegistry {
    /// Registry with every built-in tool.
    pub fn new(context: ToolContext) -> Self {
        let mut registry = Self::empty(context);
        for (descriptor, handler) in [
            (AlertsTool::descriptor(), ToolHandler::Alerts),
            (ForecastTool::descriptor(), ToolHandler::Forecast),
            (AzurePriceTool::descriptor(), ToolHandler::AzurePrice),
            (CharCountTool::descriptor(), ToolHandler::CharCount),
        ] {
            let registered = registry.register(descriptor, handler);
            debug_assert!(registered.is_ok(), "built-in tool registered twice: {registered:?}");
        }
        registry
    }

    /// Registry with no tools.
    pub fn empty(context: ToolContext) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            context,
        }
    }

    /// Add a tool. Names must be unique.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: ToolHandler,
    ) -> Result<(), ToolError> {
        if self.index.contains_key(descriptor.name) {
            return Err(ToolError::Duplicate(descriptor.name.to_string()));
        }
        self.index.insert(descriptor.name, self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Find a tool by name.
    pub fn lookup(&self, name: &str) -> Result<&RegisteredTool, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::not_found(name))
    }

    /// Get all tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.descriptor.name).collect()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor)
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    /// Look up, validate and run one invocation.
    ///
    /// Always yields exactly one result. Unknown tools and bad arguments are
    /// failure results and never reach a handler.
    pub async fn invoke(&self, request: InvocationRequest) -> InvocationResult {
        let InvocationRequest {
            correlation_id,
            tool_name,
            arguments,
        } = request;

        let tool = match self.lookup(&tool_name) {
            Ok(tool) => tool,
            Err(e) => {
                warn!("Unknown tool requested: {}", tool_name);
                return InvocationResult::failure(correlation_id, e.to_string());
            }
        };

        let args = match tool.descriptor.validate(&arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Rejected arguments for {}: {}", tool_name, e);
                return InvocationResult::failure(correlation_id, e.to_string());
            }
        };

        debug!("Dispatching {}", tool_name);
        match tool.handler.invoke(&args, &self.context).await {
            Ok(text) => InvocationResult::success(correlation_id, text),
            Err(e) => InvocationResult::failure(correlation_id, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::context::UpstreamEndpoints;
    use crate::domains::tools::invocation::ToolOutcome;
    use serde_json::{Value, json};
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn args(value: Value) -> rmcp::model::JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::new(ToolContext::default());
        assert_eq!(
            registry.tool_names(),
            vec![
                "get_alerts",
                "get_forecast",
                "get_azure_price",
                "count_chinese_characters"
            ]
        );
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        let err = registry
            .register(AlertsTool::descriptor(), ToolHandler::Alerts)
            .unwrap_err();
        assert_eq!(err, ToolError::Duplicate("get_alerts".to_string()));
    }

    #[test]
    fn test_builtin_names_are_distinct() {
        let registry = ToolRegistry::new(ToolContext::default());
        let mut names = registry.tool_names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_checked_params_match_schema() {
        let registry = ToolRegistry::new(ToolContext::default());
        for descriptor in registry.descriptors() {
            let schema = descriptor.input_schema.as_ref();
            let mut properties: Vec<&str> = schema["properties"]
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            let mut required: Vec<&str> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            let mut checked: Vec<&str> = descriptor.params.iter().map(|p| p.name).collect();
            properties.sort_unstable();
            required.sort_unstable();
            checked.sort_unstable();

            assert_eq!(checked, properties, "{}", descriptor.name);
            assert_eq!(checked, required, "{}", descriptor.name);

            for param in &descriptor.params {
                assert_eq!(
                    schema["properties"][param.name]["type"],
                    json!(param.kind.json_type()),
                    "{}.{}",
                    descriptor.name,
                    param.name
                );
                assert!(schema["properties"][param.name]["description"].is_string());
            }
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ToolRegistry::new(ToolContext::default());
        assert_eq!(
            registry.lookup("nope").unwrap_err(),
            ToolError::not_found("nope")
        );
        assert_eq!(
            registry.lookup("get_forecast").unwrap().handler,
            ToolHandler::Forecast
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_makes_no_upstream_calls() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let registry =
            ToolRegistry::new(ToolContext::with_endpoints(UpstreamEndpoints::rooted_at(&server.uri())));
        let result = registry
            .invoke(InvocationRequest::new(json!(1), "get_weather", args(json!({ "state": "CA" }))))
            .await;

        assert_eq!(result.correlation_id, json!(1));
        assert_eq!(
            result.outcome,
            ToolOutcome::Error("Unknown tool: get_weather".to_string())
        );
    }

    #[tokio::test]
    async fn test_bad_arguments_never_reach_handler() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let registry =
            ToolRegistry::new(ToolContext::with_endpoints(UpstreamEndpoints::rooted_at(&server.uri())));
        let result = registry
            .invoke(InvocationRequest::new(
                json!("f-1"),
                "get_forecast",
                args(json!({ "latitude": "north", "longitude": 1.0 })),
            ))
            .await;

        assert!(result.is_error());
        assert!(result.text().contains("'latitude'"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_success_outcome() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry =
            ToolRegistry::new(ToolContext::with_endpoints(UpstreamEndpoints::rooted_at(&server.uri())));
        let result = registry
            .invoke(InvocationRequest::new(json!(9), "get_alerts", args(json!({ "state": "ZZ" }))))
            .await;

        assert_eq!(
            result,
            InvocationResult::success(json!(9), "Unable to fetch alerts or no alerts found.")
        );
    }
}
