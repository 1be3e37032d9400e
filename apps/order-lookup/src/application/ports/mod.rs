//! Port Interfaces
//!
//! Both streaming handlers depend only on two capabilities: "receive the
//! next request" and "send the next response". Modeling these as small
//! traits keeps the matching and assembly logic transport-independent and
//! unit-testable without a network stack; the gRPC layer provides the
//! production adapters.

use async_trait::async_trait;

use crate::domain::order::OrderMatch;

/// A failure on the underlying transport, fatal to the current session.
///
/// Normal end-of-input is not an error; sources signal it with
/// `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Receiving the next inbound request failed.
    #[error("failed to receive request: {0}")]
    Receive(String),

    /// Sending an outbound response failed.
    #[error("failed to send response: {0}")]
    Send(String),
}

/// Inbound cursor over a session's request sequence.
#[async_trait]
pub trait RequestSource: Send {
    /// Receive the next query, or `Ok(None)` once the peer signals
    /// end-of-input.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Receive`] on any transport failure other
    /// than normal end-of-input.
    async fn next_query(&mut self) -> Result<Option<String>, SessionError>;
}

/// Outbound sink for a session's response sequence.
#[async_trait]
pub trait ResponseSink: Send {
    /// Send one assembled match to the peer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Send`] if the transport rejects the
    /// response (connection lost, stream aborted).
    async fn send(&mut self, response: OrderMatch) -> Result<(), SessionError>;
}
