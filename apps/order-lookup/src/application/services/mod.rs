//! Session Services
//!
//! Drives the two streaming disciplines over the capability ports:
//!
//! - [`OrderLookupService::serve_one`]: one request, zero or more
//!   responses, then done (server-streaming).
//! - [`OrderLookupService::serve_session`]: a receive loop over an
//!   unbounded request sequence, emitting each request's full response
//!   batch before reading the next (bidirectional).
//!
//! Both share the catalog matcher and response assembly; they differ only
//! in cardinality and termination discipline.

use std::sync::Arc;

use crate::application::ports::{RequestSource, ResponseSink, SessionError};
use crate::domain::catalog::Catalog;
use crate::domain::order::OrderMatch;

/// Bidirectional session lifecycle.
///
/// End-of-input on the inbound direction is the only non-error path to
/// `Closed`; any transport failure aborts the session from whichever
/// state it is in.
#[derive(Debug, PartialEq, Eq)]
enum SessionState {
    /// Waiting for the next inbound request.
    Open,
    /// Matching and emitting responses for one received request.
    Processing(String),
    /// Peer signaled end-of-input; session is complete.
    Closed,
}

/// Totals for one completed bidirectional session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Requests received before end-of-input.
    pub requests: u64,
    /// Responses emitted across all requests.
    pub responses: u64,
    /// Requests whose query matched no catalog entry.
    pub no_match_requests: u64,
}

/// Matches queries against the catalog and emits responses per session.
#[derive(Debug, Clone)]
pub struct OrderLookupService {
    catalog: Arc<Catalog>,
}

impl OrderLookupService {
    /// Create a service over an immutably shared catalog.
    #[must_use]
    pub const fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// The catalog this service matches against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Serve one server-streaming call: match `query` once and emit one
    /// response per matching entry, in catalog order. A request with zero
    /// matches emits nothing and completes normally.
    ///
    /// Returns the number of responses emitted.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SessionError`] from the sink; no partial
    /// results are suppressed and nothing is retried.
    pub async fn serve_one<S: ResponseSink>(
        &self,
        query: &str,
        sink: &mut S,
    ) -> Result<u64, SessionError> {
        let mut emitted = 0;
        for entry in self.catalog.matches(query) {
            sink.send(OrderMatch::assemble(entry)).await?;
            emitted += 1;
        }
        Ok(emitted)
    }

    /// Serve one bidirectional session: read requests until the peer
    /// signals end-of-input, emitting each request's full response batch
    /// before reading the next. Request processing is strictly
    /// sequential, never pipelined.
    ///
    /// # Errors
    ///
    /// A receive error other than end-of-input, or any send error,
    /// aborts the session; requests not yet read are abandoned.
    pub async fn serve_session<R, S>(
        &self,
        source: &mut R,
        sink: &mut S,
    ) -> Result<SessionSummary, SessionError>
    where
        R: RequestSource,
        S: ResponseSink,
    {
        let mut state = SessionState::Open;
        let mut summary = SessionSummary::default();

        loop {
            state = match state {
                SessionState::Open => match source.next_query().await? {
                    Some(query) => SessionState::Processing(query),
                    None => SessionState::Closed,
                },
                SessionState::Processing(query) => {
                    summary.requests += 1;
                    let emitted = self.serve_one(&query, sink).await?;
                    if emitted == 0 {
                        summary.no_match_requests += 1;
                    }
                    summary.responses += emitted;
                    SessionState::Open
                }
                SessionState::Closed => break,
            };
        }

        Ok(summary)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::catalog::DEFAULT_ITEMS;

    /// Source fed from a fixed script of queries, optionally ending in an
    /// injected receive failure instead of end-of-input.
    struct ScriptedSource {
        queries: Vec<String>,
        fail_at_end: bool,
    }

    impl ScriptedSource {
        fn new(queries: &[&str]) -> Self {
            Self {
                queries: queries.iter().rev().map(ToString::to_string).collect(),
                fail_at_end: false,
            }
        }

        fn failing(queries: &[&str]) -> Self {
            Self {
                fail_at_end: true,
                ..Self::new(queries)
            }
        }
    }

    #[async_trait]
    impl RequestSource for ScriptedSource {
        async fn next_query(&mut self) -> Result<Option<String>, SessionError> {
            match self.queries.pop() {
                Some(query) => Ok(Some(query)),
                None if self.fail_at_end => {
                    Err(SessionError::Receive("connection reset".to_string()))
                }
                None => Ok(None),
            }
        }
    }

    /// Sink recording emitted item names, optionally failing after a
    /// fixed number of sends.
    #[derive(Default)]
    struct RecordingSink {
        emitted: Vec<OrderMatch>,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl ResponseSink for RecordingSink {
        async fn send(&mut self, response: OrderMatch) -> Result<(), SessionError> {
            if self.fail_after.is_some_and(|n| self.emitted.len() >= n) {
                return Err(SessionError::Send("stream aborted".to_string()));
            }
            self.emitted.push(response);
            Ok(())
        }
    }

    fn item_names(sink: &RecordingSink) -> Vec<&str> {
        sink.emitted.iter().map(|m| m.item_name.as_str()).collect()
    }

    fn service() -> OrderLookupService {
        OrderLookupService::new(Arc::new(Catalog::default()))
    }

    #[tokio::test]
    async fn serve_one_emits_matches_in_catalog_order() {
        let mut sink = RecordingSink::default();
        let emitted = service().serve_one("apple", &mut sink).await.unwrap();

        assert_eq!(emitted, 3);
        assert_eq!(item_names(&sink), ["apple", "red apple", "green apple"]);
        assert!(sink.emitted.iter().all(|m| !m.time_stamp.is_empty()));
    }

    #[tokio::test]
    async fn serve_one_with_no_match_emits_nothing() {
        let mut sink = RecordingSink::default();
        let emitted = service().serve_one("zzz", &mut sink).await.unwrap();

        assert_eq!(emitted, 0);
        assert!(sink.emitted.is_empty());
    }

    #[tokio::test]
    async fn serve_one_propagates_send_failure() {
        let mut sink = RecordingSink {
            fail_after: Some(1),
            ..RecordingSink::default()
        };
        let err = service().serve_one("apple", &mut sink).await.unwrap_err();

        assert!(matches!(err, SessionError::Send(_)));
        // The first response went out before the transport failed.
        assert_eq!(item_names(&sink), ["apple"]);
    }

    #[tokio::test]
    async fn serve_session_processes_requests_sequentially() {
        let mut source = ScriptedSource::new(&["banana", "kiwi", ""]);
        let mut sink = RecordingSink::default();

        let summary = service()
            .serve_session(&mut source, &mut sink)
            .await
            .unwrap();

        assert_eq!(summary.requests, 3);
        assert_eq!(summary.responses, 2 + DEFAULT_ITEMS.len() as u64);
        assert_eq!(summary.no_match_requests, 0);

        // banana's batch, then kiwi's, then the full catalog for "".
        let mut expected = vec!["banana", "kiwi"];
        expected.extend(DEFAULT_ITEMS);
        assert_eq!(item_names(&sink), expected);
    }

    #[tokio::test]
    async fn serve_session_end_of_input_is_success() {
        let mut source = ScriptedSource::new(&[]);
        let mut sink = RecordingSink::default();

        let summary = service()
            .serve_session(&mut source, &mut sink)
            .await
            .unwrap();

        assert_eq!(summary, SessionSummary::default());
    }

    #[tokio::test]
    async fn serve_session_no_match_request_continues_session() {
        let mut source = ScriptedSource::new(&["zzz", "pear"]);
        let mut sink = RecordingSink::default();

        let summary = service()
            .serve_session(&mut source, &mut sink)
            .await
            .unwrap();

        assert_eq!(summary.requests, 2);
        assert_eq!(summary.responses, 1);
        assert_eq!(summary.no_match_requests, 1);
        assert_eq!(item_names(&sink), ["pear"]);
    }

    #[tokio::test]
    async fn serve_session_counts_every_unmatched_request() {
        let mut source = ScriptedSource::new(&["zzz", "qqq", "xyz"]);
        let mut sink = RecordingSink::default();

        let summary = service()
            .serve_session(&mut source, &mut sink)
            .await
            .unwrap();

        assert_eq!(summary.requests, 3);
        assert_eq!(summary.responses, 0);
        assert_eq!(summary.no_match_requests, 3);
        assert!(sink.emitted.is_empty());
    }

    #[tokio::test]
    async fn serve_session_propagates_receive_failure() {
        let mut source = ScriptedSource::failing(&["banana"]);
        let mut sink = RecordingSink::default();

        let err = service()
            .serve_session(&mut source, &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Receive(_)));
        // The request read before the failure was still served.
        assert_eq!(item_names(&sink), ["banana"]);
    }

    #[tokio::test]
    async fn serve_session_propagates_send_failure() {
        let mut source = ScriptedSource::new(&["apple", "banana"]);
        let mut sink = RecordingSink {
            fail_after: Some(2),
            ..RecordingSink::default()
        };

        let err = service()
            .serve_session(&mut source, &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Send(_)));
        // "banana" was never read; the session aborted mid-batch.
        assert_eq!(item_names(&sink), ["apple", "red apple"]);
    }

    #[tokio::test]
    async fn repeated_requests_yield_identical_match_sets() {
        let mut source = ScriptedSource::new(&["apple", "apple"]);
        let mut sink = RecordingSink::default();

        let summary = service()
            .serve_session(&mut source, &mut sink)
            .await
            .unwrap();

        assert_eq!(summary.responses, 6);
        let names = item_names(&sink);
        assert_eq!(names[..3], names[3..]);
    }
}
