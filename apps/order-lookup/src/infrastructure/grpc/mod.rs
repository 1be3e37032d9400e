//! gRPC Streaming Server
//!
//! Implements the `OrderManagement` gRPC service over the application
//! layer's session services.
//!
//! # Architecture
//!
//! Each streaming RPC:
//!
//! 1. Adapts the tonic request/response streams to the application
//!    layer's `RequestSource`/`ResponseSink` ports
//! 2. Spawns one task that drives the session to completion
//! 3. Hands tonic a `ReceiverStream` fed by that task
//!
//! The generated protobuf stubs are checked into `proto/` (no build-time
//! codegen step).

pub mod server;

// Allow clippy warnings and missing docs in generated code
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto {
    pub mod ordersystem {
        pub mod v1 {
            include!("proto/ordersystem.v1.rs");
            include!("proto/ordersystem.v1.tonic.rs");
        }
    }
}

pub use server::{OrderLookupServer, OrderLookupServerConfig, ServiceStats};
