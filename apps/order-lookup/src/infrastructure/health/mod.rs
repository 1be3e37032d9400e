//! Health Check and Metrics Endpoint
//!
//! HTTP endpoint for health checks, session statistics, and Prometheus
//! metrics. Used by container orchestrators, load balancers, and
//! monitoring systems.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns JSON health status
//! - `GET /healthz` - Kubernetes liveness probe (simple OK)
//! - `GET /readyz` - Kubernetes readiness probe (checks catalog)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::grpc::server::ServiceStats;
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy".
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Catalog status.
    pub catalog: CatalogStatus,
    /// Streaming session statistics.
    pub sessions: SessionStatus,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Catalog loaded and serving.
    Healthy,
    /// Nothing to serve.
    Unhealthy,
}

/// Catalog status.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogStatus {
    /// Number of entries being served.
    pub entries: usize,
}

/// Streaming session statistics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionStatus {
    /// Sessions currently open.
    pub active: i32,
    /// Sessions opened since startup.
    pub total: u64,
    /// Requests received since startup.
    pub requests: u64,
    /// Responses emitted since startup.
    pub responses: u64,
}

// =============================================================================
// Health Server State
// =============================================================================

/// Shared state for the health server.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    catalog_size: usize,
    stats: Arc<ServiceStats>,
}

impl HealthServerState {
    /// Create new health server state. Uptime is reported relative to
    /// `started_at`, the instant the gRPC server was constructed.
    #[must_use]
    pub const fn new(
        version: String,
        started_at: Instant,
        catalog_size: usize,
        stats: Arc<ServiceStats>,
    ) -> Self {
        Self {
            version,
            started_at,
            catalog_size,
            stats,
        }
    }
}

// =============================================================================
// Health Server
// =============================================================================

/// Health check HTTP server.
pub struct HealthServer {
    port: u16,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a new health server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<HealthServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the health server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HealthServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let app = Router::new()
            .route("/health", get(health_handler))
            .route("/healthz", get(liveness_handler))
            .route("/readyz", get(readiness_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| HealthServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HealthServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    // Ready once the catalog has something to match against.
    if state.catalog_size > 0 {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

fn build_health_response(state: &HealthServerState) -> HealthResponse {
    let status = if state.catalog_size > 0 {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        catalog: CatalogStatus {
            entries: state.catalog_size,
        },
        sessions: SessionStatus {
            active: state.stats.active_sessions(),
            total: state.stats.sessions_started(),
            requests: state.stats.requests_received(),
            responses: state.stats.responses_emitted(),
        },
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Health server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_state(catalog_size: usize) -> HealthServerState {
        HealthServerState::new(
            "0.1.0".to_string(),
            Instant::now(),
            catalog_size,
            Arc::new(ServiceStats::default()),
        )
    }

    #[test]
    fn health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn healthy_with_populated_catalog() {
        let response = build_health_response(&make_state(10));
        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.catalog.entries, 10);
    }

    #[test]
    fn unhealthy_with_empty_catalog() {
        let response = build_health_response(&make_state(0));
        assert_eq!(response.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn uptime_is_measured_from_the_given_start_instant() {
        let started_at = Instant::now() - std::time::Duration::from_secs(90);
        let state = HealthServerState::new(
            "0.1.0".to_string(),
            started_at,
            10,
            Arc::new(ServiceStats::default()),
        );

        let response = build_health_response(&state);
        assert!(response.uptime_secs >= 90);
    }

    #[test]
    fn session_counters_flow_into_response() {
        let state = make_state(10);
        state.stats.session_opened();
        state.stats.record_request();
        state.stats.record_response();

        let response = build_health_response(&state);
        assert_eq!(response.sessions.active, 1);
        assert_eq!(response.sessions.total, 1);
        assert_eq!(response.sessions.requests, 1);
        assert_eq!(response.sessions.responses, 1);
    }
}
