//! gRPC Streaming Server Implementation
//!
//! Implements the `OrderManagement` gRPC service: one handler per
//! streaming mode, both delegating to the application layer's
//! `OrderLookupService`.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};

use super::proto::ordersystem::v1::{
    OrderRequest, OrderResponse, order_management_server::OrderManagement,
};
use crate::application::ports::{RequestSource, ResponseSink, SessionError};
use crate::application::services::OrderLookupService;
use crate::domain::order::OrderMatch;
use crate::infrastructure::metrics::{
    StreamMode, record_match_duration, record_no_matches, record_request, record_response,
    record_session_closed, record_session_started,
};

// =============================================================================
// Type Aliases
// =============================================================================

type StreamResult<T> = Result<Response<T>, Status>;
type BoxedStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// Outbound channel capacity per session. Batches are bounded by the
/// catalog size, so a small buffer suffices.
const RESPONSE_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the gRPC streaming server.
#[derive(Debug, Clone)]
pub struct OrderLookupServerConfig {
    /// Service version string.
    pub version: String,
}

impl Default for OrderLookupServerConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// Service Statistics
// =============================================================================

/// Counters shared between the gRPC handlers and the health endpoint.
#[derive(Debug, Default)]
pub struct ServiceStats {
    active_sessions: AtomicI32,
    sessions_started: AtomicU64,
    requests_received: AtomicU64,
    responses_emitted: AtomicU64,
}

impl ServiceStats {
    /// Record a session opening (either streaming mode).
    pub fn session_opened(&self) {
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session ending, normally or not.
    pub fn session_closed(&self) {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record one inbound request.
    pub fn record_request(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one outbound response.
    pub fn record_response(&self) {
        self.responses_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Sessions currently being served.
    #[must_use]
    pub fn active_sessions(&self) -> i32 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    /// Sessions opened since startup.
    #[must_use]
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started.load(Ordering::Relaxed)
    }

    /// Requests received since startup.
    #[must_use]
    pub fn requests_received(&self) -> u64 {
        self.requests_received.load(Ordering::Relaxed)
    }

    /// Responses emitted since startup.
    #[must_use]
    pub fn responses_emitted(&self) -> u64 {
        self.responses_emitted.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Port Adapters
// =============================================================================

/// Inbound cursor over a tonic request stream.
///
/// Requests are processed strictly sequentially, so the time between
/// handing out one query and being asked for the next is that query's
/// match-and-emit duration.
struct GrpcRequestSource {
    inner: Streaming<OrderRequest>,
    stats: Arc<ServiceStats>,
    mode: StreamMode,
    in_flight: Option<Instant>,
}

#[async_trait]
impl RequestSource for GrpcRequestSource {
    async fn next_query(&mut self) -> Result<Option<String>, SessionError> {
        if let Some(started) = self.in_flight.take() {
            record_match_duration(self.mode, started.elapsed());
        }
        match self.inner.message().await {
            Ok(Some(request)) => {
                self.stats.record_request();
                record_request(self.mode);
                self.in_flight = Some(Instant::now());
                Ok(Some(request.items))
            }
            // End-of-input from the peer: the normal terminal.
            Ok(None) => Ok(None),
            Err(status) => Err(SessionError::Receive(status.to_string())),
        }
    }
}

/// Outbound sink feeding a session's `ReceiverStream`.
struct GrpcResponseSink {
    tx: mpsc::Sender<Result<OrderResponse, Status>>,
    stats: Arc<ServiceStats>,
    mode: StreamMode,
}

#[async_trait]
impl ResponseSink for GrpcResponseSink {
    async fn send(&mut self, response: OrderMatch) -> Result<(), SessionError> {
        let response = OrderResponse {
            item_name: response.item_name,
            time_stamp: response.time_stamp,
        };
        self.tx
            .send(Ok(response))
            .await
            .map_err(|_| SessionError::Send("response stream closed by client".to_string()))?;
        self.stats.record_response();
        record_response(self.mode);
        Ok(())
    }
}

fn session_error_to_status(err: &SessionError) -> Status {
    match err {
        SessionError::Receive(_) | SessionError::Send(_) => Status::aborted(err.to_string()),
    }
}

// =============================================================================
// Server Implementation
// =============================================================================

/// gRPC server for the order lookup service.
pub struct OrderLookupServer {
    config: OrderLookupServerConfig,
    service: OrderLookupService,
    started_at: Instant,
    stats: Arc<ServiceStats>,
}

impl OrderLookupServer {
    /// Create a new gRPC server over the given session service.
    #[must_use]
    pub fn new(config: OrderLookupServerConfig, service: OrderLookupService) -> Self {
        Self {
            config,
            service,
            started_at: Instant::now(),
            stats: Arc::new(ServiceStats::default()),
        }
    }

    /// Service statistics, shared with the health endpoint.
    #[must_use]
    pub fn stats(&self) -> Arc<ServiceStats> {
        Arc::clone(&self.stats)
    }

    /// Version string reported by the health endpoint.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Instant the server was constructed.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Number of entries in the served catalog.
    #[must_use]
    pub fn catalog_size(&self) -> usize {
        self.service.catalog().len()
    }
}

#[tonic::async_trait]
impl OrderManagement for OrderLookupServer {
    type GetOrderServerStreamingStream = BoxedStream<OrderResponse>;
    type GetOrderBidirectionalStream = BoxedStream<OrderResponse>;

    async fn get_order_server_streaming(
        &self,
        request: Request<OrderRequest>,
    ) -> StreamResult<Self::GetOrderServerStreamingStream> {
        let query = request.into_inner().items;
        let session_id = uuid::Uuid::new_v4();
        let mode = StreamMode::ServerStreaming;

        self.stats.session_opened();
        self.stats.record_request();
        record_session_started(mode);
        record_request(mode);

        let service = self.service.clone();
        let stats = Arc::clone(&self.stats);
        let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let opened = Instant::now();
            let mut sink = GrpcResponseSink {
                tx: tx.clone(),
                stats: Arc::clone(&stats),
                mode,
            };

            match service.serve_one(&query, &mut sink).await {
                Ok(emitted) => {
                    record_match_duration(mode, opened.elapsed());
                    if emitted == 0 {
                        record_no_matches(mode, 1);
                    }
                    tracing::debug!(
                        session_id = %session_id,
                        query = %query,
                        emitted,
                        "server-streaming call complete"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %err,
                        "server-streaming call aborted"
                    );
                    let _ = tx.send(Err(session_error_to_status(&err))).await;
                }
            }

            stats.session_closed();
            record_session_closed(mode, opened.elapsed());
        });

        let stream = ReceiverStream::new(rx);
        Ok(Response::new(
            Box::pin(stream) as Self::GetOrderServerStreamingStream
        ))
    }

    async fn get_order_bidirectional(
        &self,
        request: Request<Streaming<OrderRequest>>,
    ) -> StreamResult<Self::GetOrderBidirectionalStream> {
        let session_id = uuid::Uuid::new_v4();
        let mode = StreamMode::Bidirectional;

        self.stats.session_opened();
        record_session_started(mode);

        let service = self.service.clone();
        let stats = Arc::clone(&self.stats);
        let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);

        let mut source = GrpcRequestSource {
            inner: request.into_inner(),
            stats: Arc::clone(&self.stats),
            mode,
            in_flight: None,
        };

        tokio::spawn(async move {
            let opened = Instant::now();
            let mut sink = GrpcResponseSink {
                tx: tx.clone(),
                stats: Arc::clone(&stats),
                mode,
            };

            match service.serve_session(&mut source, &mut sink).await {
                Ok(summary) => {
                    if summary.no_match_requests > 0 {
                        record_no_matches(mode, summary.no_match_requests);
                    }
                    tracing::debug!(
                        session_id = %session_id,
                        requests = summary.requests,
                        responses = summary.responses,
                        no_match_requests = summary.no_match_requests,
                        "bidirectional session closed"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %err,
                        "bidirectional session aborted"
                    );
                    let _ = tx.send(Err(session_error_to_status(&err))).await;
                }
            }

            stats.session_closed();
            record_session_closed(mode, opened.elapsed());
        });

        let stream = ReceiverStream::new(rx);
        Ok(Response::new(
            Box::pin(stream) as Self::GetOrderBidirectionalStream
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;

    fn make_server() -> OrderLookupServer {
        OrderLookupServer::new(
            OrderLookupServerConfig::default(),
            OrderLookupService::new(Arc::new(Catalog::default())),
        )
    }

    #[test]
    fn stats_track_session_lifecycle() {
        let stats = ServiceStats::default();

        stats.session_opened();
        stats.session_opened();
        assert_eq!(stats.active_sessions(), 2);
        assert_eq!(stats.sessions_started(), 2);

        stats.session_closed();
        assert_eq!(stats.active_sessions(), 1);
        assert_eq!(stats.sessions_started(), 2);
    }

    #[test]
    fn stats_track_traffic() {
        let stats = ServiceStats::default();

        stats.record_request();
        stats.record_response();
        stats.record_response();

        assert_eq!(stats.requests_received(), 1);
        assert_eq!(stats.responses_emitted(), 2);
    }

    #[test]
    fn server_exposes_catalog_size_and_version() {
        let server = make_server();
        assert_eq!(server.catalog_size(), 10);
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
        assert!(server.started_at() <= Instant::now());
    }

    #[tokio::test]
    async fn sink_reports_closed_receiver_as_send_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let mut sink = GrpcResponseSink {
            tx,
            stats: Arc::new(ServiceStats::default()),
            mode: StreamMode::ServerStreaming,
        };

        let err = sink.send(OrderMatch::assemble("apple")).await.unwrap_err();
        assert!(matches!(err, SessionError::Send(_)));
    }
}
