//! Sessions and the registry of active sessions.
//!
//! A session is created when a client opens the event stream. The stream side
//! ([`SessionStream`]) owns the receiving half of the outbound channel; when it
//! is dropped the session leaves the registry and further writes fail.

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};

use dashmap::{DashMap, DashSet};
use futures::Stream;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use uuid::Uuid;

use super::envelope::JsonRpcResponse;
use super::error::{GatewayError, SessionClosed};

/// Outbound queue depth per session.
pub const OUTBOUND_CAPACITY: usize = 64;

/// Server-assigned session identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| GatewayError::InvalidSessionId)
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Stream open, `initialize` not yet received.
    AwaitingHandshake,
    /// Tool invocations are accepted.
    Ready,
    /// Stream gone or closed by the server.
    Closed,
}

/// Items written to the event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Where the client should POST its messages. Always the first item.
    Endpoint(String),
    /// A JSON-RPC message.
    Message(JsonRpcResponse),
    /// Ends the stream.
    Close,
}

/// One live session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    sender: mpsc::Sender<Outbound>,
    state: watch::Sender<SessionState>,
    in_flight: DashSet<String>,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Complete the handshake. Returns false unless the session was awaiting it.
    pub fn mark_ready(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == SessionState::AwaitingHandshake {
                *state = SessionState::Ready;
                true
            } else {
                false
            }
        })
    }

    /// Queue a message for the stream.
    ///
    /// Waits only while the queue is full. Fails once the session is closed.
    pub async fn send(&self, response: JsonRpcResponse) -> Result<(), SessionClosed> {
        if self.state() == SessionState::Closed {
            return Err(SessionClosed);
        }
        self.sender
            .send(Outbound::Message(response))
            .await
            .map_err(|_| SessionClosed)
    }

    /// Track a request id until its result is sent. False if already in flight.
    pub fn begin_request(&self, id: &Value) -> bool {
        self.in_flight.insert(id.to_string())
    }

    /// Send the single result for an in-flight request.
    pub async fn finish_request(&self, response: JsonRpcResponse) -> Result<(), SessionClosed> {
        let key = response.id.as_ref().map(Value::to_string).unwrap_or_default();
        if self.in_flight.remove(&key).is_none() {
            debug!(session = %self.id, id = %key, "Result for unknown request dropped");
            return Ok(());
        }
        self.send(response).await
    }

    /// Resolves once the stream side is gone.
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Mark closed and end the stream. Later writes fail.
    pub async fn close(&self) {
        if self.state.send_replace(SessionState::Closed) != SessionState::Closed {
            let _ = self.sender.send(Outbound::Close).await;
        }
    }
}

/// Active sessions, keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a session.
    ///
    /// The first stream item is the endpoint `{messages_path}?session_id={id}`.
    pub fn open(self: &Arc<Self>, messages_path: &str) -> (Arc<Session>, SessionStream) {
        let id = SessionId::new();
        let (sender, receiver) = mpsc::channel(OUTBOUND_CAPACITY);
        let (state, _) = watch::channel(SessionState::AwaitingHandshake);

        // Fresh channel with spare capacity: cannot fail.
        let _ = sender.try_send(Outbound::Endpoint(format!(
            "{messages_path}?session_id={id}"
        )));

        let session = Arc::new(Session {
            id,
            sender,
            state,
            in_flight: DashSet::new(),
        });
        self.sessions.insert(id, session.clone());
        info!(session = %id, "Session opened ({} active)", self.sessions.len());

        let stream = SessionStream {
            receiver,
            _guard: SessionGuard {
                id,
                registry: self.clone(),
            },
        };
        (session, stream)
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Drop a session from the registry and mark it closed.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        let (_, session) = self.sessions.remove(id)?;
        session.state.send_replace(SessionState::Closed);
        info!(session = %id, "Session removed ({} active)", self.sessions.len());
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Removes its session from the registry when dropped.
#[derive(Debug)]
struct SessionGuard {
    id: SessionId,
    registry: Arc<SessionRegistry>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}

/// The outbound side of a session, consumed by the event stream.
#[derive(Debug)]
pub struct SessionStream {
    receiver: mpsc::Receiver<Outbound>,
    _guard: SessionGuard,
}

impl Stream for SessionStream {
    type Item = Outbound;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(Outbound::Close)) => Poll::Ready(None),
            other => other,
        }
    }
}
