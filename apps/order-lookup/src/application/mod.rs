//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the session-handling services and the stream
//! capability ports they depend on, keeping the match-and-emit logic
//! independent of the transport.

/// Stream capability ports (inbound cursor + outbound sink).
pub mod ports;

/// Session services driving the streaming state machines.
pub mod services;
