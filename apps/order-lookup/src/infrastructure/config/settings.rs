//! Service Configuration Settings
//!
//! Configuration types for the order lookup service, loaded from
//! environment variables.

use crate::domain::catalog::DEFAULT_ITEMS;

/// Server port settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// gRPC server port.
    pub grpc_port: u16,
    /// Health check HTTP port.
    pub health_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            grpc_port: 50051,
            health_port: 8081,
        }
    }
}

/// Catalog contents.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Entries matched against incoming queries, in serving order.
    pub items: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            items: DEFAULT_ITEMS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Server port settings.
    pub server: ServerSettings,
    /// Catalog contents.
    pub catalog: CatalogSettings,
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// `ORDER_CATALOG` holds a comma-separated entry list; when unset the
    /// built-in catalog is served.
    ///
    /// # Errors
    ///
    /// Returns an error if `ORDER_CATALOG` is set but contains no entries.
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = ServerSettings {
            grpc_port: parse_env_u16("ORDER_GRPC_PORT", ServerSettings::default().grpc_port),
            health_port: parse_env_u16("ORDER_HEALTH_PORT", ServerSettings::default().health_port),
        };

        let catalog = match std::env::var("ORDER_CATALOG") {
            Ok(raw) => parse_catalog(&raw)?,
            Err(_) => CatalogSettings::default(),
        };

        Ok(Self { server, catalog })
    }
}

/// Parse a comma-separated catalog list, dropping blank entries.
fn parse_catalog(raw: &str) -> Result<CatalogSettings, ConfigError> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect();
    if items.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }
    Ok(CatalogSettings { items })
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `ORDER_CATALOG` was set but parsed to zero entries.
    #[error("ORDER_CATALOG is set but contains no catalog entries")]
    EmptyCatalog,
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_settings_defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.grpc_port, 50051);
        assert_eq!(settings.health_port, 8081);
    }

    #[test]
    fn catalog_settings_default_to_builtin_entries() {
        let settings = CatalogSettings::default();
        assert_eq!(settings.items.len(), DEFAULT_ITEMS.len());
        assert_eq!(settings.items[0], "banana");
    }

    #[test]
    fn parse_catalog_trims_and_drops_blank_entries() {
        let settings = parse_catalog(" apple , banana ,, kiwi ").unwrap();
        assert_eq!(settings.items, vec!["apple", "banana", "kiwi"]);
    }

    #[test]
    fn parse_catalog_rejects_blank_list() {
        assert!(matches!(parse_catalog(" , ,"), Err(ConfigError::EmptyCatalog)));
        assert!(matches!(parse_catalog(""), Err(ConfigError::EmptyCatalog)));
    }

    #[test]
    fn parse_env_u16_falls_back_when_unset() {
        assert_eq!(parse_env_u16("ORDER_TEST_PORT_UNSET", 7070), 7070);
    }
}
