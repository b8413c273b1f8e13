//! Domain models for the talent-flow graph
//!
//! Persons, companies and transitions live in the external graph store;
//! these types describe the narrow slice of them the ranking core touches:
//! store-issued node identities, projected bipartite edges, and ranked
//! score rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-issued internal node identifier
pub type NodeId = i64;

/// Weighting scheme for the bipartite projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightScheme {
    /// One unit of weight per qualifying transition
    #[default]
    Count,
    /// Weight clamped to exactly 1 regardless of transition count
    Binary,
}

impl WeightScheme {
    /// Parse from a request string, rejecting unknown schemes
    pub fn parse(s: &str) -> Result<Self, crate::errors::AppError> {
        match s {
            "count" => Ok(WeightScheme::Count),
            "binary" => Ok(WeightScheme::Binary),
            other => Err(crate::errors::AppError::InvalidWeightScheme {
                scheme: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightScheme::Count => "count",
            WeightScheme::Binary => "binary",
        }
    }
}

impl std::fmt::Display for WeightScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two partitions of the projected graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeLabel {
    Person,
    Company,
}

impl NodeLabel {
    /// The store-side label string
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Person => "Person",
            NodeLabel::Company => "Company",
        }
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted person→company edge of the bipartite projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedEdge {
    /// Person node id
    pub source: NodeId,
    /// Company node id
    pub target: NodeId,
    /// Accumulated weight, >= 1 for every projected edge
    pub weight: f64,
}

/// Display metadata for a node, resolved from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub label: NodeLabel,
}

/// A scored node as returned by stream-mode ranking and the rankings reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNode {
    pub node_id: NodeId,
    pub name: String,
    pub label: NodeLabel,
    pub score: f64,
}

/// Deterministic ranking order: descending score, ties broken by ascending
/// node id.
pub fn sort_ranked(nodes: &mut [RankedNode]) {
    nodes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
}

/// A raw career-transition event (person moving between employers).
///
/// Stored and collapsed by the graph store; the ranking engine never reads
/// these directly, it only consumes the projection derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub profile_urn: String,
    pub from_company_urn: String,
    pub to_company_urn: String,
    pub transition_date: DateTime<Utc>,
    pub transition_type: String,
}
