//! GraphStore collaborator contract
//!
//! The persisted property graph (persons, companies, transitions) lives in
//! an external store. The ranking core consumes it through this narrow
//! trait: projection lifecycle, edge streaming, the store's built-in
//! PageRank, name resolution and property write-back. All calls are
//! treated as opaque RPCs; store failures bubble up verbatim and are never
//! retried here.

pub mod http;

use crate::errors::Result;
use crate::models::{NodeId, NodeInfo, NodeLabel, ProjectedEdge, RankedNode};
use async_trait::async_trait;
use std::collections::HashMap;

pub use http::HttpGraphStore;

/// Options for the store's built-in PageRank
#[derive(Debug, Clone)]
pub struct PageRankOptions {
    /// Damping factor, must lie in (0, 1)
    pub damping: f64,
    /// Iteration cap
    pub iterations: u32,
    /// When set, scores are persisted under this node property and the
    /// call streams no rows
    pub write_property: Option<String>,
}

/// A raw `(node, score)` row streamed back from the store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeScore {
    pub node_id: NodeId,
    pub score: f64,
}

/// Contract consumed by the ranking core
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create a named projection from node and edge selector queries
    async fn create_projection(
        &self,
        name: &str,
        node_selector: &str,
        edge_selector: &str,
    ) -> Result<()>;

    /// Drop a named projection. Dropping a projection that does not exist
    /// is not an error.
    async fn drop_projection(&self, name: &str) -> Result<()>;

    /// Stream the full weighted edge set of a projection.
    ///
    /// The core pulls the edge set into memory once per ranking request;
    /// this bounds scalability to projections whose edge count fits in
    /// memory.
    async fn stream_edges(&self, name: &str) -> Result<Vec<ProjectedEdge>>;

    /// Run the store's built-in PageRank over a projection. Returns the
    /// scored rows in stream mode, or an empty vector in write mode.
    async fn run_page_rank(&self, name: &str, opts: &PageRankOptions) -> Result<Vec<NodeScore>>;

    /// Resolve display names and labels for a set of node ids
    async fn resolve_node_names(&self, ids: &[NodeId]) -> Result<HashMap<NodeId, NodeInfo>>;

    /// Persist one property value per node in a single batched statement.
    /// The write is all-or-nothing: a failure leaves every listed node
    /// untouched. `ids` and `values` must have equal length.
    async fn write_node_property(
        &self,
        ids: &[NodeId],
        property: &str,
        values: &[f64],
    ) -> Result<()>;

    /// Top-N nodes by a previously written property, descending, ties
    /// broken by ascending node id
    async fn top_nodes_by_property(
        &self,
        property: &str,
        label: Option<NodeLabel>,
        limit: usize,
    ) -> Result<Vec<RankedNode>>;

    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> Result<()>;
}
