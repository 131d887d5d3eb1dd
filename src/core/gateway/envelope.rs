//! JSON-RPC 2.0 envelopes exchanged on a session.
//!
//! Inbound messages are decoded into [`JsonRpcRequest`]; `tools/call` requests
//! become [`InvocationRequest`]s. Every outbound message is a
//! [`JsonRpcResponse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domains::tools::{InvocationRequest, InvocationResult};

pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC request or notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Decode one message body.
    pub fn decode(body: &[u8]) -> Result<Self, String> {
        let request: Self = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        if request.jsonrpc != "2.0" {
            return Err(format!("unsupported jsonrpc version '{}'", request.jsonrpc));
        }
        Ok(request)
    }

    /// Notifications carry no id and get no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Read a `tools/call` request as an invocation.
    pub fn to_invocation(&self) -> Result<InvocationRequest, String> {
        let id = self.id.clone().unwrap_or(Value::Null);
        let params = self.params.as_ref().ok_or("Missing params")?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or("Missing tool name")?;

        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => Default::default(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err("Tool arguments must be an object".to_string()),
        };

        Ok(InvocationRequest::new(id, name, arguments))
    }
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_REQUEST, msg)
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_PARAMS, msg)
    }
}

impl From<InvocationResult> for JsonRpcResponse {
    fn from(result: InvocationResult) -> Self {
        let body = result.to_call_result_json();
        Self::success(Some(result.correlation_id), body)
    }
}
