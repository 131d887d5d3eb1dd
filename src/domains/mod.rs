//! Domains module containing business logic organized by bounded contexts.
//!
//! - **tools**: the tools clients can invoke, their registry and dispatch
//! - **upstream**: outbound HTTP with absent-on-failure semantics and pagination

pub mod tools;
pub mod upstream;
