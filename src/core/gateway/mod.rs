//! Tool-invocation gateway.
//!
//! Transport-independent core of the SSE server:
//! - `session.rs` - sessions, their outbound streams and the active-session registry
//! - `envelope.rs` - JSON-RPC decoding and encoding
//! - `dispatcher.rs` - handshake, method routing and concurrent tool dispatch
//! - `error.rs` - session-scoped faults

mod dispatcher;
pub mod envelope;
mod error;
pub mod session;

pub use dispatcher::{Gateway, SUPPORTED_PROTOCOL_VERSIONS, ServerIdentity, negotiate_version};
pub use envelope::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use error::{GatewayError, SessionClosed};
pub use session::{Outbound, SessionId, SessionRegistry, SessionState, SessionStream};
