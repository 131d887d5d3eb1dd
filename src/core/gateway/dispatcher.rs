//! Gateway dispatcher - binds session messages to the tool registry.
//!
//! Per session the dispatcher runs the `AwaitingHandshake → Ready → Closed`
//! state machine. Each `tools/call` runs on its own task, so results may be
//! delivered out of order; every result carries its request id.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{Instrument, debug, info, info_span, warn};

use super::envelope::{JsonRpcRequest, JsonRpcResponse};
use super::error::GatewayError;
use super::session::{Session, SessionId, SessionRegistry, SessionState, SessionStream};
use crate::domains::tools::{InvocationRequest, ToolRegistry};

/// Protocol revisions this gateway speaks, oldest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// Name, version and instructions reported in the handshake.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub instructions: String,
}

/// Routes client messages to sessions and tools.
#[derive(Debug, Clone)]
pub struct Gateway {
    registry: Arc<ToolRegistry>,
    sessions: Arc<SessionRegistry>,
    identity: Arc<ServerIdentity>,
}

impl Gateway {
    pub fn new(registry: Arc<ToolRegistry>, identity: ServerIdentity) -> Self {
        Self {
            registry,
            sessions: Arc::new(SessionRegistry::new()),
            identity: Arc::new(identity),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Open a session whose client posts to `messages_path`.
    pub fn open_session(&self, messages_path: &str) -> (SessionId, SessionStream) {
        let (session, stream) = self.sessions.open(messages_path);
        (session.id(), stream)
    }

    /// Accept one client message posted for `session_id`.
    ///
    /// Responses are delivered on the session stream, not returned. A body
    /// that is not a JSON-RPC message closes the session.
    pub async fn accept(&self, session_id: Option<&str>, body: &[u8]) -> Result<(), GatewayError> {
        let id: SessionId = session_id.ok_or(GatewayError::MissingSessionId)?.parse()?;
        let session = self.sessions.get(&id).ok_or(GatewayError::SessionNotFound)?;

        let request = match JsonRpcRequest::decode(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(session = %id, "Malformed message, closing session: {}", e);
                session.close().await;
                self.sessions.remove(&id);
                return Err(GatewayError::Malformed(e));
            }
        };

        self.handle(&session, request).await;
        Ok(())
    }

    async fn handle(&self, session: &Arc<Session>, request: JsonRpcRequest) {
        debug!(session = %session.id(), method = %request.method, "Received message");

        if request.is_notification() {
            handle_notification(session, &request);
            return;
        }

        let response = match request.method.as_str() {
            "initialize" => self.initialize(session, &request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            _ if session.state() != SessionState::Ready => JsonRpcResponse::invalid_request(
                request.id,
                "Received request before initialization was complete",
            ),
            "tools/list" => self.list_tools(request.id),
            "tools/call" => return self.call_tool(session, &request).await,
            method => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::method_not_found(request.id, method)
            }
        };

        reply(session, response).await;
    }

    fn initialize(&self, session: &Session, request: &JsonRpcRequest) -> JsonRpcResponse {
        if !session.mark_ready() {
            return JsonRpcResponse::invalid_request(
                request.id.clone(),
                "Session already initialized",
            );
        }

        let requested = request
            .params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = negotiate_version(requested);
        info!(session = %session.id(), "Session initialized (protocol {})", version);

        JsonRpcResponse::success(
            request.id.clone(),
            json!({
                "protocolVersion": version,
                "capabilities": {
                    "tools": { "listChanged": false }
                },
                "serverInfo": {
                    "name": self.identity.name,
                    "version": self.identity.version
                },
                "instructions": self.identity.instructions
            }),
        )
    }

    fn list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools: Vec<Value> = self.registry.descriptors().map(|d| d.to_json()).collect();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn call_tool(&self, session: &Arc<Session>, request: &JsonRpcRequest) {
        let invocation = match request.to_invocation() {
            Ok(invocation) => invocation,
            Err(e) => {
                reply(session, JsonRpcResponse::invalid_params(request.id.clone(), e)).await;
                return;
            }
        };

        if !session.begin_request(&invocation.correlation_id) {
            warn!(
                session = %session.id(),
                "Duplicate request id {} rejected", invocation.correlation_id
            );
            reply(
                session,
                JsonRpcResponse::invalid_request(request.id.clone(), "Duplicate request id"),
            )
            .await;
            return;
        }

        self.spawn_invocation(session.clone(), invocation);
    }

    /// Run one invocation on its own task. If the session goes away first the
    /// invocation is dropped, abandoning any upstream call in progress.
    fn spawn_invocation(&self, session: Arc<Session>, invocation: InvocationRequest) {
        let registry = self.registry.clone();
        let span = info_span!(
            "invocation",
            session = %session.id(),
            tool = %invocation.tool_name,
            id = %invocation.correlation_id
        );

        tokio::spawn(
            async move {
                let result = tokio::select! {
                    result = registry.invoke(invocation) => result,
                    _ = session.closed() => {
                        debug!("Session closed, invocation abandoned");
                        return;
                    }
                };

                if session.finish_request(result.into()).await.is_err() {
                    debug!("Session closed before result could be sent");
                }
            }
            .instrument(span),
        );
    }
}

fn handle_notification(session: &Session, request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => {
            info!(session = %session.id(), "Client sent initialized notification");
        }
        other => debug!(session = %session.id(), "Received notification: {}", other),
    }
}

async fn reply(session: &Session, response: JsonRpcResponse) {
    if session.send(response).await.is_err() {
        debug!(session = %session.id(), "Reply dropped, session closed");
    }
}

/// Echo the client's version when supported, otherwise offer the newest.
pub fn negotiate_version(requested: Option<&str>) -> &'static str {
    let latest = SUPPORTED_PROTOCOL_VERSIONS[SUPPORTED_PROTOCOL_VERSIONS.len() - 1];
    requested
        .and_then(|r| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|v| **v == r).copied())
        .unwrap_or(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::session::Outbound;
    use crate::domains::tools::{ToolContext, UpstreamEndpoints};
    use futures::StreamExt;
    use std::collections::HashSet;
    use std::time::Duration;
    use wiremock::matchers::{any, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> Gateway {
        let context = ToolContext::with_endpoints(UpstreamEndpoints::rooted_at(&server.uri()));
        Gateway::new(
            Arc::new(ToolRegistry::new(context)),
            ServerIdentity {
                name: "weather".to_string(),
                version: "0.0.0".to_string(),
                instructions: "test".to_string(),
            },
        )
    }

    async fn next_message(stream: &mut SessionStream) -> JsonRpcResponse {
        match tokio::time::timeout(Duration::from_secs(5), stream.next()).await {
            Ok(Some(Outbound::Message(message))) => message,
            other => panic!("expected a message, got {other:?}"),
        }
    }

    async fn open(gateway: &Gateway) -> (String, SessionStream) {
        let (id, mut stream) = gateway.open_session("/messages/");
        assert!(matches!(stream.next().await, Some(Outbound::Endpoint(_))));
        (id.to_string(), stream)
    }

    async fn handshake(gateway: &Gateway, id: &str, stream: &mut SessionStream) {
        let body = json!({
            "jsonrpc": "2.0", "id": 0, "method": "initialize",
            "params": { "protocolVersion": "2024-11-05", "capabilities": {} }
        });
        gateway.accept(Some(id), body.to_string().as_bytes()).await.unwrap();
        let response = next_message(stream).await;
        assert_eq!(response.result.unwrap()["protocolVersion"], json!("2024-11-05"));

        let ack = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
        gateway.accept(Some(id), ack.to_string().as_bytes()).await.unwrap();
    }

    fn call(id: Value, tool: &str, arguments: Value) -> Vec<u8> {
        json!({
            "jsonrpc": "2.0", "id": id, "method": "tools/call",
            "params": { "name": tool, "arguments": arguments }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_negotiate_version() {
        assert_eq!(negotiate_version(Some("2025-03-26")), "2025-03-26");
        assert_eq!(negotiate_version(Some("1999-01-01")), "2025-06-18");
        assert_eq!(negotiate_version(None), "2025-06-18");
    }

    #[tokio::test]
    async fn test_session_lookup_errors() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);

        assert_eq!(
            gateway.accept(None, b"{}").await,
            Err(GatewayError::MissingSessionId)
        );
        assert_eq!(
            gateway.accept(Some("xyz"), b"{}").await,
            Err(GatewayError::InvalidSessionId)
        );
        assert_eq!(
            gateway.accept(Some(&SessionId::new().to_string()), b"{}").await,
            Err(GatewayError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_call_before_handshake_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;

        gateway
            .accept(Some(&id), &call(json!(1), "get_alerts", json!({ "state": "CA" })))
            .await
            .unwrap();

        let response = next_message(&mut stream).await;
        assert_eq!(response.id, Some(json!(1)));
        assert_eq!(response.error.unwrap().code, super::super::envelope::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_tools_list_after_handshake() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;
        handshake(&gateway, &id, &mut stream).await;

        let body = json!({ "jsonrpc": "2.0", "id": "list", "method": "tools/list" });
        gateway.accept(Some(&id), body.to_string().as_bytes()).await.unwrap();

        let result = next_message(&mut stream).await.result.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["get_alerts", "get_forecast", "get_azure_price", "count_chinese_characters"]
        );
        assert_eq!(
            result["tools"][1]["inputSchema"]["properties"]["latitude"]["type"],
            json!("number")
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_result() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;
        handshake(&gateway, &id, &mut stream).await;

        gateway
            .accept(Some(&id), &call(json!(5), "launch_rockets", json!({})))
            .await
            .unwrap();

        let response = next_message(&mut stream).await;
        assert_eq!(response.id, Some(json!(5)));
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["content"][0]["text"], json!("Unknown tool: launch_rockets"));
    }

    #[tokio::test]
    async fn test_concurrent_results_pair_with_requests() {
        let server = MockServer::start().await;
        Mock::given(path("/alerts/active/area/CA"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "features": [] }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(path("/alerts/active/area/ZZ"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;
        handshake(&gateway, &id, &mut stream).await;

        gateway
            .accept(Some(&id), &call(json!("slow"), "get_alerts", json!({ "state": "CA" })))
            .await
            .unwrap();
        gateway
            .accept(Some(&id), &call(json!("fast"), "get_alerts", json!({ "state": "ZZ" })))
            .await
            .unwrap();

        let first = next_message(&mut stream).await;
        let second = next_message(&mut stream).await;

        // The slow request was sent first but finishes last.
        assert_eq!(first.id, Some(json!("fast")));
        assert_eq!(
            first.result.unwrap()["content"][0]["text"],
            json!("Unable to fetch alerts or no alerts found.")
        );
        assert_eq!(second.id, Some(json!("slow")));
        assert_eq!(
            second.result.unwrap()["content"][0]["text"],
            json!("No active alerts for this state.")
        );

        let ids: HashSet<String> = [first.id, second.id]
            .iter()
            .map(|id| id.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_id_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(path("/alerts/active/area/CA"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "features": [] }))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;
        handshake(&gateway, &id, &mut stream).await;

        for _ in 0..2 {
            gateway
                .accept(Some(&id), &call(json!(7), "get_alerts", json!({ "state": "CA" })))
                .await
                .unwrap();
        }

        let rejected = next_message(&mut stream).await;
        assert_eq!(rejected.id, Some(json!(7)));
        let error = rejected.error.unwrap();
        assert_eq!(error.code, super::super::envelope::INVALID_REQUEST);
        assert_eq!(error.message, "Duplicate request id");

        let answered = next_message(&mut stream).await;
        assert_eq!(answered.id, Some(json!(7)));
        assert_eq!(
            answered.result.unwrap()["content"][0]["text"],
            json!("No active alerts for this state.")
        );
    }

    #[tokio::test]
    async fn test_malformed_message_closes_session() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;

        let err = gateway.accept(Some(&id), b"{oops").await.unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));

        assert!(stream.next().await.is_none());
        assert!(gateway.sessions().is_empty());
        assert_eq!(
            gateway.accept(Some(&id), b"{}").await,
            Err(GatewayError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_disconnect_abandons_invocation() {
        let server = MockServer::start().await;
        Mock::given(path("/alerts/active/area/CA"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "features": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;
        handshake(&gateway, &id, &mut stream).await;

        gateway
            .accept(Some(&id), &call(json!(1), "get_alerts", json!({ "state": "CA" })))
            .await
            .unwrap();
        drop(stream);

        assert!(gateway.sessions().is_empty());
        assert_eq!(
            gateway
                .accept(Some(&id), &call(json!(2), "get_alerts", json!({ "state": "CA" })))
                .await,
            Err(GatewayError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_ping_and_unknown_method() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);
        let (id, mut stream) = open(&gateway).await;

        let ping = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" });
        gateway.accept(Some(&id), ping.to_string().as_bytes()).await.unwrap();
        assert_eq!(next_message(&mut stream).await.result, Some(json!({})));

        handshake(&gateway, &id, &mut stream).await;
        let unknown = json!({ "jsonrpc": "2.0", "id": 2, "method": "resources/list" });
        gateway.accept(Some(&id), unknown.to_string().as_bytes()).await.unwrap();
        assert_eq!(
            next_message(&mut stream).await.error.unwrap().code,
            super::super::envelope::METHOD_NOT_FOUND
        );
    }
}
