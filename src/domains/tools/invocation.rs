//! Invocation request and result types.
//!
//! These are transport-neutral: the SSE gateway and the stdio transport both
//! turn their wire messages into an [`InvocationRequest`] and render the
//! [`InvocationResult`] back.

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A request to run one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Client-assigned id, echoed in the result.
    pub correlation_id: Value,

    /// The name of the tool to execute.
    pub tool_name: String,

    /// The arguments to pass to the tool.
    #[serde(default)]
    pub arguments: JsonObject,
}

impl InvocationRequest {
    pub fn new(correlation_id: Value, tool_name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            correlation_id,
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Text produced by an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum ToolOutcome {
    /// The tool ran. Upstream failures reported by the tool are still successes here.
    Success(String),
    /// The request never reached a handler (unknown tool, bad arguments).
    Error(String),
}

/// The single result of an [`InvocationRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub correlation_id: Value,
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

impl InvocationResult {
    pub fn success(correlation_id: Value, text: impl Into<String>) -> Self {
        Self {
            correlation_id,
            outcome: ToolOutcome::Success(text.into()),
        }
    }

    pub fn failure(correlation_id: Value, text: impl Into<String>) -> Self {
        Self {
            correlation_id,
            outcome: ToolOutcome::Error(text.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Error(_))
    }

    pub fn text(&self) -> &str {
        match &self.outcome {
            ToolOutcome::Success(text) | ToolOutcome::Error(text) => text,
        }
    }

    /// MCP `tools/call` result body.
    pub fn to_call_result_json(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text() }],
            "isError": self.is_error(),
        })
    }

    /// rmcp result for the stdio transport.
    pub fn into_call_tool_result(self) -> CallToolResult {
        match self.outcome {
            ToolOutcome::Success(text) => CallToolResult::success(vec![Content::text(text)]),
            ToolOutcome::Error(text) => CallToolResult::error(vec![Content::text(text)]),
        }
    }
}
