//! Configuration management for TalentFlow services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{env}.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Graph store configuration
    #[serde(default)]
    pub graph: GraphStoreConfig,

    /// Ranking defaults
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

/// Connection settings for the external graph store.
///
/// The store is an opaque collaborator reached over its HTTP transaction
/// endpoint; the core never manages its persistence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphStoreConfig {
    /// Base URI of the graph store HTTP endpoint
    #[serde(default = "default_graph_uri")]
    pub uri: String,

    /// Database name within the store
    #[serde(default = "default_graph_database")]
    pub database: String,

    /// Basic-auth user
    #[serde(default = "default_graph_user")]
    pub user: String,

    /// Basic-auth password
    #[serde(default)]
    pub password: String,

    /// Request timeout in seconds
    #[serde(default = "default_graph_timeout")]
    pub timeout_secs: u64,
}

/// Default parameters applied when ranking requests omit them
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    /// Default projection name
    #[serde(default = "default_projection_name")]
    pub projection_name: String,

    /// Damping factor for the delegated PageRank
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Iteration cap for the delegated PageRank
    #[serde(default = "default_pagerank_iterations")]
    pub pagerank_iterations: u32,

    /// BiRank person-side damping (beta)
    #[serde(default = "default_damping")]
    pub birank_beta: f64,

    /// BiRank company-side damping (alpha)
    #[serde(default = "default_damping")]
    pub birank_alpha: f64,

    /// BiRank iteration cap
    #[serde(default = "default_birank_max_iter")]
    pub birank_max_iter: u32,

    /// BiRank convergence tolerance (L-infinity)
    #[serde(default = "default_birank_tolerance")]
    pub birank_tolerance: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_graph_uri() -> String { "http://localhost:7474".to_string() }
fn default_graph_database() -> String { "neo4j".to_string() }
fn default_graph_user() -> String { "neo4j".to_string() }
fn default_graph_timeout() -> u64 { 30 }
fn default_projection_name() -> String { crate::DEFAULT_PROJECTION.to_string() }
fn default_damping() -> f64 { crate::DEFAULT_DAMPING }
fn default_pagerank_iterations() -> u32 { crate::DEFAULT_PAGERANK_ITERATIONS }
fn default_birank_max_iter() -> u32 { 100 }
fn default_birank_tolerance() -> f64 { 1e-6 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "talentflow".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            database: default_graph_database(),
            user: default_graph_user(),
            password: String::new(),
            timeout_secs: default_graph_timeout(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            projection_name: default_projection_name(),
            damping: default_damping(),
            pagerank_iterations: default_pagerank_iterations(),
            birank_beta: default_damping(),
            birank_alpha: default_damping(),
            birank_max_iter: default_birank_max_iter(),
            birank_tolerance: default_birank_tolerance(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            graph: GraphStoreConfig::default(),
            ranking: RankingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.graph.database, "neo4j");
        assert_eq!(config.ranking.projection_name, "talent_flow");
        assert!(config.ranking.damping > 0.0 && config.ranking.damping < 1.0);
        assert!(config.ranking.birank_tolerance > 0.0);
    }

    #[test]
    fn timeouts_convert_to_durations() {
        let config = AppConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
    }
}
