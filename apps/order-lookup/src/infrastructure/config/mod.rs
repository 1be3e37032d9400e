//! Configuration Module
//!
//! Configuration loading for the order lookup service.

mod settings;

pub use settings::{CatalogSettings, ConfigError, ServerSettings, ServiceConfig};
