//! In-memory GraphStore used by the crate's tests
//!
//! Holds collapsed (person, company) transition pairs and materializes
//! projections from them the way the real store executes the edge
//! selectors: weight per pair under the count scheme, clamped to 1 when
//! the selector deduplicates (binary). Edges are kept sorted by
//! (source, target) so repeated builds over unchanged data compare equal.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use talentflow_common::errors::{AppError, Result};
use talentflow_common::graph::{GraphStore, NodeScore, PageRankOptions};
use talentflow_common::models::{NodeId, NodeInfo, NodeLabel, ProjectedEdge, RankedNode};

#[derive(Default)]
struct StoreState {
    projections: HashMap<String, Vec<ProjectedEdge>>,
    properties: HashMap<NodeId, HashMap<String, f64>>,
    fail_writes: bool,
}

pub struct InMemoryGraphStore {
    transitions: Vec<(NodeId, NodeId)>,
    persons: BTreeSet<NodeId>,
    companies: BTreeSet<NodeId>,
    state: Mutex<StoreState>,
}

impl InMemoryGraphStore {
    /// Seed with collapsed (person, company) transition hops
    pub fn with_transitions(transitions: &[(NodeId, NodeId)]) -> Self {
        Self {
            transitions: transitions.to_vec(),
            persons: transitions.iter().map(|&(p, _)| p).collect(),
            companies: transitions.iter().map(|&(_, c)| c).collect(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Make every subsequent property write fail without mutating state
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    /// Read back a previously written property
    pub fn property(&self, node: NodeId, name: &str) -> Option<f64> {
        self.state
            .lock()
            .unwrap()
            .properties
            .get(&node)
            .and_then(|props| props.get(name).copied())
    }

    fn node_info(&self, id: NodeId) -> Option<NodeInfo> {
        if self.persons.contains(&id) {
            Some(NodeInfo {
                name: format!("Person {id}"),
                label: NodeLabel::Person,
            })
        } else if self.companies.contains(&id) {
            Some(NodeInfo {
                name: format!("Company {id}"),
                label: NodeLabel::Company,
            })
        } else {
            None
        }
    }

    fn project_edges(&self, binary: bool) -> Vec<ProjectedEdge> {
        let mut weights: BTreeMap<(NodeId, NodeId), f64> = BTreeMap::new();
        for &(person, company) in &self.transitions {
            *weights.entry((person, company)).or_insert(0.0) += 1.0;
        }
        weights
            .into_iter()
            .map(|((source, target), weight)| ProjectedEdge {
                source,
                target,
                weight: if binary { 1.0 } else { weight },
            })
            .collect()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn create_projection(
        &self,
        name: &str,
        _node_selector: &str,
        edge_selector: &str,
    ) -> Result<()> {
        // The binary selector deduplicates pairs; mirror that here.
        let binary = edge_selector.contains("DISTINCT");
        let edges = self.project_edges(binary);
        self.state
            .lock()
            .unwrap()
            .projections
            .insert(name.to_string(), edges);
        Ok(())
    }

    async fn drop_projection(&self, name: &str) -> Result<()> {
        self.state.lock().unwrap().projections.remove(name);
        Ok(())
    }

    async fn stream_edges(&self, name: &str) -> Result<Vec<ProjectedEdge>> {
        self.state
            .lock()
            .unwrap()
            .projections
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::ProjectionNotFound {
                name: name.to_string(),
            })
    }

    async fn run_page_rank(&self, name: &str, opts: &PageRankOptions) -> Result<Vec<NodeScore>> {
        let edges = self.stream_edges(name).await?;

        // Deterministic stand-in for the store's PageRank: incident
        // weight per node.
        let mut scores: BTreeMap<NodeId, f64> = BTreeMap::new();
        for edge in &edges {
            *scores.entry(edge.source).or_insert(0.0) += edge.weight;
            *scores.entry(edge.target).or_insert(0.0) += edge.weight;
        }

        if let Some(property) = &opts.write_property {
            let mut state = self.state.lock().unwrap();
            for (&id, &score) in &scores {
                state
                    .properties
                    .entry(id)
                    .or_default()
                    .insert(property.clone(), score);
            }
            return Ok(Vec::new());
        }

        Ok(scores
            .into_iter()
            .map(|(node_id, score)| NodeScore { node_id, score })
            .collect())
    }

    async fn resolve_node_names(&self, ids: &[NodeId]) -> Result<HashMap<NodeId, NodeInfo>> {
        Ok(ids
            .iter()
            .filter_map(|&id| self.node_info(id).map(|info| (id, info)))
            .collect())
    }

    async fn write_node_property(
        &self,
        ids: &[NodeId],
        property: &str,
        values: &[f64],
    ) -> Result<()> {
        if ids.len() != values.len() {
            return Err(AppError::Internal {
                message: "Property batch mismatch".into(),
            });
        }
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            // All-or-nothing: fail before touching anything.
            return Err(AppError::GraphQuery {
                message: "write rejected by test store".into(),
            });
        }
        for (&id, &value) in ids.iter().zip(values) {
            state
                .properties
                .entry(id)
                .or_default()
                .insert(property.to_string(), value);
        }
        Ok(())
    }

    async fn top_nodes_by_property(
        &self,
        property: &str,
        label: Option<NodeLabel>,
        limit: usize,
    ) -> Result<Vec<RankedNode>> {
        let state = self.state.lock().unwrap();
        let mut ranked: Vec<RankedNode> = state
            .properties
            .iter()
            .filter_map(|(&id, props)| {
                let score = props.get(property).copied()?;
                let info = self.node_info(id)?;
                if let Some(wanted) = label {
                    if info.label != wanted {
                        return None;
                    }
                }
                Some(RankedNode {
                    node_id: id,
                    name: info.name,
                    label: info.label,
                    score,
                })
            })
            .collect();
        talentflow_common::models::sort_ranked(&mut ranked);
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
