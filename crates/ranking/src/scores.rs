//! Score persistence and retrieval
//!
//! Write mode persists BiRank output onto graph nodes, one batched
//! property write per partition (`<prefix>_person`, `<prefix>_company`);
//! each batch commits or fails as a whole. Stream mode resolves display
//! names and returns deterministically ordered rows. The generic reader
//! serves top-N queries over any previously written property.

use crate::bipartite::BipartiteGraph;
use crate::birank::BiRankOutcome;
use std::sync::Arc;
use talentflow_common::errors::Result;
use talentflow_common::graph::http::validate_property_name;
use talentflow_common::graph::GraphStore;
use talentflow_common::models::{sort_ranked, NodeId, NodeLabel, RankedNode};

/// Ranked BiRank output for both partitions
#[derive(Debug, Clone)]
pub struct BiRankRanking {
    pub persons: Vec<RankedNode>,
    pub companies: Vec<RankedNode>,
}

pub struct ScoreStore {
    store: Arc<dyn GraphStore>,
}

impl ScoreStore {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Persist BiRank scores under `<prefix>_person` / `<prefix>_company`.
    ///
    /// Two batched writes, one per partition; a failing batch leaves every
    /// node in that batch untouched and the other partition's committed
    /// state intact.
    pub async fn write_birank(
        &self,
        graph: &BipartiteGraph,
        outcome: &BiRankOutcome,
        prefix: &str,
    ) -> Result<(String, String)> {
        let person_property = format!("{prefix}_person");
        let company_property = format!("{prefix}_company");
        validate_property_name(&person_property)?;
        validate_property_name(&company_property)?;

        self.store
            .write_node_property(graph.person_ids(), &person_property, &outcome.person_scores)
            .await?;
        self.store
            .write_node_property(
                graph.company_ids(),
                &company_property,
                &outcome.company_scores,
            )
            .await?;

        tracing::info!(
            persons = graph.person_count(),
            companies = graph.company_count(),
            prefix,
            "Persisted BiRank scores"
        );
        Ok((person_property, company_property))
    }

    /// Join display names onto BiRank output and order both partitions
    /// descending by score, ties broken by ascending node id.
    pub async fn stream_birank(
        &self,
        graph: &BipartiteGraph,
        outcome: &BiRankOutcome,
    ) -> Result<BiRankRanking> {
        let mut ids: Vec<NodeId> = Vec::with_capacity(graph.person_count() + graph.company_count());
        ids.extend_from_slice(graph.person_ids());
        ids.extend_from_slice(graph.company_ids());
        let names = self.store.resolve_node_names(&ids).await?;

        let rank = |ids: &[NodeId], scores: &[f64], label: NodeLabel| {
            let mut rows: Vec<RankedNode> = ids
                .iter()
                .zip(scores)
                .map(|(&node_id, &score)| RankedNode {
                    node_id,
                    name: names
                        .get(&node_id)
                        .map(|info| info.name.clone())
                        .unwrap_or_else(|| format!("Node_{node_id}")),
                    label,
                    score,
                })
                .collect();
            sort_ranked(&mut rows);
            rows
        };

        Ok(BiRankRanking {
            persons: rank(graph.person_ids(), &outcome.person_scores, NodeLabel::Person),
            companies: rank(
                graph.company_ids(),
                &outcome.company_scores,
                NodeLabel::Company,
            ),
        })
    }

    /// Top-N nodes by any previously written property
    pub async fn top_by_property(
        &self,
        property: &str,
        label: Option<NodeLabel>,
        limit: usize,
    ) -> Result<Vec<RankedNode>> {
        validate_property_name(property)?;
        self.store.top_nodes_by_property(property, label, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::birank::{BiRankConfig, BiRankScorer};
    use crate::test_store::InMemoryGraphStore;
    use talentflow_common::models::ProjectedEdge;

    fn edge(source: NodeId, target: NodeId, weight: f64) -> ProjectedEdge {
        ProjectedEdge { source, target, weight }
    }

    fn fixture() -> (Arc<InMemoryGraphStore>, BipartiteGraph, BiRankOutcome) {
        let store = Arc::new(InMemoryGraphStore::with_transitions(&[
            (1, 101),
            (1, 102),
            (2, 102),
            (2, 103),
        ]));
        let graph = BipartiteGraph::from_edges(&[
            edge(1, 101, 1.0),
            edge(1, 102, 1.0),
            edge(2, 102, 1.0),
            edge(2, 103, 1.0),
        ]);
        let outcome = BiRankScorer::new(BiRankConfig::default())
            .unwrap()
            .compute(&graph);
        (store, graph, outcome)
    }

    #[tokio::test]
    async fn write_then_read_reproduces_stream_ordering() {
        let (store, graph, outcome) = fixture();
        let scores = ScoreStore::new(store.clone());

        let streamed = scores.stream_birank(&graph, &outcome).await.unwrap();
        scores.write_birank(&graph, &outcome, "birank").await.unwrap();

        let read_back = scores
            .top_by_property("birank_company", Some(NodeLabel::Company), 10)
            .await
            .unwrap();

        let streamed_ids: Vec<_> = streamed.companies.iter().map(|r| r.node_id).collect();
        let read_ids: Vec<_> = read_back.iter().map(|r| r.node_id).collect();
        assert_eq!(streamed_ids, read_ids);
        for (a, b) in streamed.companies.iter().zip(&read_back) {
            assert!((a.score - b.score).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_previous_scores_untouched() {
        let (store, graph, outcome) = fixture();
        let scores = ScoreStore::new(store.clone());
        scores.write_birank(&graph, &outcome, "birank").await.unwrap();
        let committed = store.property(102, "birank_company").unwrap();

        store.set_fail_writes(true);
        let rerun = BiRankOutcome {
            person_scores: vec![9.0; outcome.person_scores.len()],
            company_scores: vec![9.0; outcome.company_scores.len()],
            iterations: 1,
            converged: true,
        };
        assert!(scores.write_birank(&graph, &rerun, "birank").await.is_err());
        assert_eq!(store.property(102, "birank_company").unwrap(), committed);
    }

    #[tokio::test]
    async fn stream_rows_are_sorted_with_id_tiebreak() {
        let (store, graph, _) = fixture();
        let scores = ScoreStore::new(store);
        // Symmetric graph: P1 and P2 share a score, so ordering must fall
        // back to ascending id.
        let outcome = BiRankOutcome {
            person_scores: vec![0.5, 0.5],
            company_scores: vec![0.1, 0.9, 0.1],
            iterations: 1,
            converged: true,
        };
        let ranking = scores.stream_birank(&graph, &outcome).await.unwrap();

        let person_ids: Vec<_> = ranking.persons.iter().map(|r| r.node_id).collect();
        assert_eq!(person_ids, vec![1, 2]);
        let company_ids: Vec<_> = ranking.companies.iter().map(|r| r.node_id).collect();
        assert_eq!(company_ids, vec![102, 101, 103]);
    }

    #[tokio::test]
    async fn bad_prefix_is_rejected_before_writing() {
        let (store, graph, outcome) = fixture();
        let scores = ScoreStore::new(store.clone());
        assert!(scores
            .write_birank(&graph, &outcome, "bad prefix")
            .await
            .is_err());
        assert!(store.property(101, "bad prefix_company").is_none());
    }
}
