//! SSE transport implementation.
//!
//! A client opens `GET /sse` and receives an `endpoint` event naming the URL
//! to POST its JSON-RPC messages to. Every reply is delivered on the stream as
//! a `message` event; the POST itself only answers `202 Accepted`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::SseConfig};
use crate::core::McpServer;
use crate::core::gateway::{Gateway, GatewayError, Outbound};

/// Interval between keep-alive comments on idle streams.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// SSE transport handler.
pub struct SseTransport {
    config: SseConfig,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    gateway: Gateway,
    config: Arc<SseConfig>,
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    session_id: Option<String>,
}

impl SseTransport {
    /// Create a new SSE transport with the given config.
    pub fn new(config: SseConfig) -> Self {
        Self { config }
    }

    /// Build the router serving `gateway`.
    pub fn router(&self, gateway: Gateway) -> Router {
        let state = AppState {
            gateway,
            config: Arc::new(self.config.clone()),
        };

        let mut app = Router::new()
            .route(&self.config.sse_path, get(handle_sse))
            .route(&self.config.messages_path, post(handle_message));

        // Accept the messages path with and without its trailing slash.
        let trimmed = self.config.messages_path.trim_end_matches('/');
        if !trimmed.is_empty() && trimmed != self.config.messages_path {
            app = app.route(trimmed, post(handle_message));
        }

        let mut app = app
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state);

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the SSE transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.config.address();
        let gateway = Gateway::new(server.registry().clone(), server.identity());
        let app = self.router(gateway);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (SSE, CORS {})", addr, cors_status);
        info!("  → Stream:   GET {}", self.config.sse_path);
        info!("  → Messages: POST {}?session_id=...", self.config.messages_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Open a session and stream its outbound messages.
#[instrument(skip_all)]
async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, BoxError>>> {
    let (id, outbound) = state.gateway.open_session(&state.config.messages_path);
    info!(session = %id, "Event stream opened");

    let stream = outbound.map(to_event);

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

fn to_event(outbound: Outbound) -> Result<Event, BoxError> {
    match outbound {
        Outbound::Endpoint(uri) => Ok(Event::default().event("endpoint").data(uri)),
        Outbound::Message(message) => {
            let json_data = serde_json::to_string(&message).map_err(|e| Box::new(e) as BoxError)?;
            Ok(Event::default().event("message").data(json_data))
        }
        Outbound::Close => Ok(Event::default().comment("closed")),
    }
}

/// Accept one client message for a session.
#[instrument(skip_all, fields(session))]
async fn handle_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    if let Some(id) = &query.session_id {
        tracing::Span::current().record("session", id.as_str());
    }

    match state.gateway.accept(query.session_id.as_deref(), &body).await {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) => {
            warn!("Rejected message: {}", e);
            e.into_response()
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::SessionNotFound => StatusCode::NOT_FOUND,
            GatewayError::MissingSessionId
            | GatewayError::InvalidSessionId
            | GatewayError::Malformed(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "transport": "SSE",
        "endpoints": {
            "sse": state.config.sse_path,
            "messages": state.config.messages_path,
            "health": "/health"
        },
        "activeSessions": state.gateway.sessions().len(),
        "protocol": "JSON-RPC 2.0"
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
