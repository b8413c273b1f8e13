//! Ranking service
//!
//! Ties the projection builder, the PageRank delegate, the BiRank engine
//! and score persistence together behind one capability, so callers are
//! agnostic to which backend produced a score.
//!
//! Concurrency contract: requests are independent and share no mutable
//! state, but there is no locking over projection names — a rebuild
//! racing a concurrent read on the same name is undefined, callers must
//! serialize rebuild-then-read themselves. Termination of BiRank is
//! guaranteed by its iteration cap, so no internal deadline is applied.

use crate::bipartite::BipartiteGraph;
use crate::birank::{BiRankConfig, BiRankScorer};
use crate::pagerank::PageRankDelegate;
use crate::projection::{validate_graph_name, ProjectionBuilder};
use crate::scores::ScoreStore;
use std::sync::Arc;
use std::time::Instant;
use talentflow_common::errors::Result;
use talentflow_common::graph::{GraphStore, PageRankOptions};
use talentflow_common::metrics;
use talentflow_common::models::{NodeLabel, RankedNode, WeightScheme};

/// The two ranking backends behind one capability
#[derive(Debug, Clone)]
pub enum BipartiteRanker {
    /// Pass-through to the store's built-in PageRank
    DelegatedPageRank(PageRankOptions),
    /// In-process degree-normalized alternating power iteration
    BiRank {
        config: BiRankConfig,
        /// When set, scores are persisted under `<prefix>_person` /
        /// `<prefix>_company` instead of being streamed
        write_prefix: Option<String>,
    },
}

/// Result of a ranking request
#[derive(Debug, Clone)]
pub enum RankingOutput {
    /// Write mode: scores persisted under these node properties
    Written {
        properties: Vec<String>,
        iterations: u32,
        converged: bool,
    },
    /// Stream mode, delegated PageRank: one ranked list over all nodes
    PageRank { results: Vec<RankedNode> },
    /// Stream mode, BiRank: ranked lists for both partitions
    BiRank {
        persons: Vec<RankedNode>,
        companies: Vec<RankedNode>,
        iterations: u32,
        converged: bool,
    },
}

pub struct RankingService {
    store: Arc<dyn GraphStore>,
    projections: ProjectionBuilder,
    pagerank: PageRankDelegate,
    scores: ScoreStore,
}

impl RankingService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            projections: ProjectionBuilder::new(store.clone()),
            pagerank: PageRankDelegate::new(store.clone()),
            scores: ScoreStore::new(store.clone()),
            store,
        }
    }

    /// Build (or rebuild) the bipartite talent-flow projection
    pub async fn build_projection(
        &self,
        name: &str,
        scheme: WeightScheme,
        delete_existing: bool,
    ) -> Result<()> {
        self.projections.build(name, scheme, delete_existing).await
    }

    /// Run a ranking backend over a named projection
    pub async fn rank(&self, name: &str, ranker: BipartiteRanker) -> Result<RankingOutput> {
        let start = Instant::now();
        let output = match ranker {
            BipartiteRanker::DelegatedPageRank(opts) => {
                let result = self.pagerank.run(name, &opts).await?;
                metrics::record_ranking(
                    "pagerank",
                    start.elapsed().as_secs_f64(),
                    opts.iterations as usize,
                );
                match result {
                    None => RankingOutput::Written {
                        properties: vec![opts.write_property.clone().unwrap_or_default()],
                        iterations: opts.iterations,
                        converged: true,
                    },
                    Some(results) => RankingOutput::PageRank { results },
                }
            }
            BipartiteRanker::BiRank { config, write_prefix } => {
                validate_graph_name(name)?;
                let scorer = BiRankScorer::new(config)?;

                // The full edge set is pulled into memory once per
                // request; the projection must fit.
                let edges = self.store.stream_edges(name).await?;
                let graph = BipartiteGraph::from_edges(&edges);
                let outcome = scorer.compute(&graph);

                metrics::record_ranking(
                    "birank",
                    start.elapsed().as_secs_f64(),
                    outcome.iterations as usize,
                );
                tracing::info!(
                    graph = name,
                    persons = graph.person_count(),
                    companies = graph.company_count(),
                    iterations = outcome.iterations,
                    converged = outcome.converged,
                    "Computed BiRank scores"
                );

                match write_prefix {
                    Some(prefix) => {
                        let (person_property, company_property) =
                            self.scores.write_birank(&graph, &outcome, &prefix).await?;
                        RankingOutput::Written {
                            properties: vec![person_property, company_property],
                            iterations: outcome.iterations,
                            converged: outcome.converged,
                        }
                    }
                    None => {
                        let ranking = self.scores.stream_birank(&graph, &outcome).await?;
                        RankingOutput::BiRank {
                            persons: ranking.persons,
                            companies: ranking.companies,
                            iterations: outcome.iterations,
                            converged: outcome.converged,
                        }
                    }
                }
            }
        };
        Ok(output)
    }

    /// Top-N nodes by a previously written ranking property
    pub async fn rankings(
        &self,
        property: &str,
        label: Option<NodeLabel>,
        limit: usize,
    ) -> Result<Vec<RankedNode>> {
        self.scores.top_by_property(property, label, limit).await
    }

    /// Connectivity probe for readiness checks
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_store::InMemoryGraphStore;
    use talentflow_common::errors::AppError;

    fn service_with_flow() -> (Arc<InMemoryGraphStore>, RankingService) {
        // P1: C1→C2, P2: C2→C3
        let store = Arc::new(InMemoryGraphStore::with_transitions(&[
            (1, 101),
            (1, 102),
            (2, 102),
            (2, 103),
        ]));
        let service = RankingService::new(store.clone());
        (store, service)
    }

    fn birank(write_prefix: Option<&str>) -> BipartiteRanker {
        BipartiteRanker::BiRank {
            config: BiRankConfig::default(),
            write_prefix: write_prefix.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn end_to_end_birank_ranks_the_shared_company_first() {
        let (_, service) = service_with_flow();
        service
            .build_projection("talent_flow", WeightScheme::Count, false)
            .await
            .unwrap();

        match service.rank("talent_flow", birank(None)).await.unwrap() {
            RankingOutput::BiRank { companies, converged, .. } => {
                assert!(converged);
                assert_eq!(companies[0].node_id, 102);
                assert_eq!(companies[0].name, "Company 102");
            }
            other => panic!("expected BiRank output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn write_mode_persists_both_partitions() {
        let (store, service) = service_with_flow();
        service
            .build_projection("talent_flow", WeightScheme::Count, false)
            .await
            .unwrap();

        match service
            .rank("talent_flow", birank(Some("birank")))
            .await
            .unwrap()
        {
            RankingOutput::Written { properties, converged, .. } => {
                assert_eq!(properties, vec!["birank_person", "birank_company"]);
                assert!(converged);
            }
            other => panic!("expected write ack, got {other:?}"),
        }

        assert!(store.property(1, "birank_person").is_some());
        assert!(store.property(102, "birank_company").is_some());

        let top = service
            .rankings("birank_company", Some(NodeLabel::Company), 2)
            .await
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].node_id, 102);
    }

    #[tokio::test]
    async fn empty_projection_streams_empty_results() {
        let store = Arc::new(InMemoryGraphStore::with_transitions(&[]));
        let service = RankingService::new(store);
        service
            .build_projection("talent_flow", WeightScheme::Count, false)
            .await
            .unwrap();

        match service.rank("talent_flow", birank(None)).await.unwrap() {
            RankingOutput::BiRank { persons, companies, converged, .. } => {
                assert!(persons.is_empty());
                assert!(companies.is_empty());
                assert!(converged);
            }
            other => panic!("expected BiRank output, got {other:?}"),
        }

        let delegated = BipartiteRanker::DelegatedPageRank(PageRankOptions {
            damping: 0.85,
            iterations: 20,
            write_property: None,
        });
        match service.rank("talent_flow", delegated).await.unwrap() {
            RankingOutput::PageRank { results } => assert!(results.is_empty()),
            other => panic!("expected PageRank output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_parameters_fail_before_touching_the_store() {
        let (_, service) = service_with_flow();
        // No projection built: a validation failure must come first.
        let err = service
            .rank(
                "talent_flow",
                BipartiteRanker::BiRank {
                    config: BiRankConfig { alpha: 0.0, ..BiRankConfig::default() },
                    write_prefix: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn failed_write_back_never_corrupts_stored_scores() {
        let (store, service) = service_with_flow();
        service
            .build_projection("talent_flow", WeightScheme::Count, false)
            .await
            .unwrap();
        service
            .rank("talent_flow", birank(Some("birank")))
            .await
            .unwrap();
        let committed = store.property(102, "birank_company").unwrap();

        store.set_fail_writes(true);
        assert!(service
            .rank("talent_flow", birank(Some("birank")))
            .await
            .is_err());
        assert_eq!(store.property(102, "birank_company").unwrap(), committed);
    }
}
