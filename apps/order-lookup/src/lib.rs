#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Lookup Service - Streaming Catalog Matcher
//!
//! A gRPC service that matches free-text item queries against an
//! in-memory catalog and streams one response per matching entry, over
//! either a server-streaming or a bidirectional-streaming RPC.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core matching logic and data types
//!   - `catalog`: The entry list and substring matcher
//!   - `order`: Matched-response assembly
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Interfaces for request sources and response sinks
//!   - `services`: Per-query and per-session lookup orchestration
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `grpc`: gRPC streaming server implementation
//!   - `config`: Configuration loading
//!   - `health`: Health check HTTP endpoint
//!   - `metrics`: Prometheus instrumentation
//!   - `telemetry`: OpenTelemetry tracing
//!
//! # Data Flow
//!
//! ```text
//!                  ┌─────────────┐     ┌─────────────┐
//! Client queries ─►│    gRPC     │────►│   Lookup    │──► matched
//!                  │   Server    │◄────│   Service   │    responses
//!                  └─────────────┘     └─────────────┘
//!                                             │
//!                                       ┌─────┴─────┐
//!                                       │  Catalog  │
//!                                       └───────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core matching types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::catalog::{Catalog, DEFAULT_ITEMS};
pub use domain::order::OrderMatch;

// Application services and ports
pub use application::ports::{RequestSource, ResponseSink, SessionError};
pub use application::services::{OrderLookupService, SessionSummary};

// Infrastructure config
pub use infrastructure::config::{CatalogSettings, ConfigError, ServerSettings, ServiceConfig};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// gRPC server (for integration tests)
pub use infrastructure::grpc::{
    proto::ordersystem::v1 as proto,
    server::{OrderLookupServer, OrderLookupServerConfig, ServiceStats},
};

// Metrics
pub use infrastructure::metrics::{StreamMode, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
