//! TalentFlow Common Library
//!
//! Shared code for the TalentFlow services including:
//! - Configuration management
//! - Error types and handling
//! - Domain models (persons, companies, transitions, rankings)
//! - The GraphStore collaborator contract and its HTTP client
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod graph;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use graph::{GraphStore, PageRankOptions};
pub use models::{NodeId, NodeLabel, ProjectedEdge, RankedNode, WeightScheme};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default projection name for the talent-flow bipartite graph
pub const DEFAULT_PROJECTION: &str = "talent_flow";

/// Default damping factor for the delegated PageRank
pub const DEFAULT_DAMPING: f64 = 0.85;

/// Default iteration cap for the delegated PageRank
pub const DEFAULT_PAGERANK_ITERATIONS: u32 = 20;
