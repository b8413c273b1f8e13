//! Graph ranking handlers
//!
//! The four operations of the ranking pipeline: build the bipartite
//! projection, run the delegated PageRank, run BiRank, and read back
//! previously written rankings. Request fields omitted by the caller
//! fall back to the configured ranking defaults.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use crate::AppState;
use talentflow_common::{
    errors::{AppError, Result},
    graph::PageRankOptions,
    metrics,
    models::{NodeLabel, RankedNode, WeightScheme},
};
use talentflow_ranking::{BiRankConfig, BipartiteRanker, RankingOutput};

/// Projection build request
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectionRequest {
    /// Projection name; defaults to the configured one
    pub graph_name: Option<String>,

    /// "count" (default) or "binary"
    #[serde(default = "default_weight_scheme")]
    pub weight_scheme: String,

    /// Drop an existing projection of the same name first
    #[serde(default)]
    pub delete_existing: bool,
}

fn default_weight_scheme() -> String {
    WeightScheme::Count.as_str().to_string()
}

#[derive(Serialize)]
pub struct ProjectionResponse {
    pub success: bool,
    pub graph: String,
    pub weight_scheme: String,
    pub processing_time_ms: u64,
}

/// Delegated PageRank request
#[derive(Debug, Deserialize)]
pub struct PageRankRequest {
    pub graph_name: Option<String>,
    pub damping: Option<f64>,
    pub iterations: Option<u32>,

    /// When set, scores are persisted under this node property instead of
    /// being streamed back
    pub write_property: Option<String>,
}

/// BiRank request
#[derive(Debug, Deserialize)]
pub struct BiRankRequest {
    pub graph_name: Option<String>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub max_iter: Option<u32>,
    pub tolerance: Option<f64>,

    /// When set, scores are persisted under `<prefix>_person` /
    /// `<prefix>_company` instead of being streamed back
    pub write_prefix: Option<String>,
}

/// Ranking response, shaped by the output mode
#[derive(Serialize)]
#[serde(untagged)]
pub enum RankingResponse {
    Written {
        success: bool,
        graph: String,
        properties: Vec<String>,
        iterations: u32,
        converged: bool,
        processing_time_ms: u64,
    },
    PageRank {
        graph: String,
        results: Vec<RankedNode>,
        processing_time_ms: u64,
    },
    BiRank {
        graph: String,
        persons: Vec<RankedNode>,
        companies: Vec<RankedNode>,
        iterations: u32,
        converged: bool,
        processing_time_ms: u64,
    },
}

/// Rankings read-back query
#[derive(Debug, Deserialize, Validate)]
pub struct RankingsQuery {
    /// Node property holding previously written scores
    #[validate(length(min = 1, max = 128))]
    pub property_name: String,

    /// Restrict to one partition; both when omitted
    pub label: Option<NodeLabel>,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Serialize)]
pub struct RankingsResponse {
    pub property_name: String,
    pub total_results: usize,
    pub results: Vec<RankedNode>,
}

/// Build (or rebuild) the bipartite talent-flow projection
pub async fn build_projection(
    State(state): State<AppState>,
    Json(request): Json<ProjectionRequest>,
) -> Result<Json<ProjectionResponse>> {
    let start = Instant::now();

    let graph = graph_name(&state, request.graph_name);
    let scheme = WeightScheme::parse(&request.weight_scheme)?;

    state
        .service
        .build_projection(&graph, scheme, request.delete_existing)
        .await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    metrics::record_request("/graph/projection", processing_time_ms as f64 / 1000.0);

    Ok(Json(ProjectionResponse {
        success: true,
        graph,
        weight_scheme: scheme.as_str().to_string(),
        processing_time_ms,
    }))
}

/// Run the store's built-in PageRank over the projection
pub async fn page_rank(
    State(state): State<AppState>,
    Json(request): Json<PageRankRequest>,
) -> Result<Json<RankingResponse>> {
    let start = Instant::now();

    let graph = graph_name(&state, request.graph_name);
    let defaults = &state.config.ranking;
    let opts = PageRankOptions {
        damping: request.damping.unwrap_or(defaults.damping),
        iterations: request.iterations.unwrap_or(defaults.pagerank_iterations),
        write_property: request.write_property,
    };

    let output = state
        .service
        .rank(&graph, BipartiteRanker::DelegatedPageRank(opts))
        .await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    metrics::record_request("/graph/pagerank", processing_time_ms as f64 / 1000.0);

    Ok(Json(ranking_response(graph, output, processing_time_ms)))
}

/// Run BiRank over the projection
pub async fn bi_rank(
    State(state): State<AppState>,
    Json(request): Json<BiRankRequest>,
) -> Result<Json<RankingResponse>> {
    let start = Instant::now();

    let graph = graph_name(&state, request.graph_name);
    let defaults = &state.config.ranking;
    let config = BiRankConfig {
        alpha: request.alpha.unwrap_or(defaults.birank_alpha),
        beta: request.beta.unwrap_or(defaults.birank_beta),
        max_iter: request.max_iter.unwrap_or(defaults.birank_max_iter),
        tolerance: request.tolerance.unwrap_or(defaults.birank_tolerance),
    };

    let output = state
        .service
        .rank(
            &graph,
            BipartiteRanker::BiRank {
                config,
                write_prefix: request.write_prefix,
            },
        )
        .await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    metrics::record_request("/graph/birank", processing_time_ms as f64 / 1000.0);

    Ok(Json(ranking_response(graph, output, processing_time_ms)))
}

/// Read back top-N nodes by a previously written ranking property
pub async fn rankings(
    State(state): State<AppState>,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<RankingsResponse>> {
    let start = Instant::now();

    query.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let results = state
        .service
        .rankings(&query.property_name, query.label, query.limit)
        .await?;

    metrics::record_request("/graph/rankings", start.elapsed().as_secs_f64());

    Ok(Json(RankingsResponse {
        property_name: query.property_name,
        total_results: results.len(),
        results,
    }))
}

fn graph_name(state: &AppState, requested: Option<String>) -> String {
    requested.unwrap_or_else(|| state.config.ranking.projection_name.clone())
}

fn ranking_response(graph: String, output: RankingOutput, processing_time_ms: u64) -> RankingResponse {
    match output {
        RankingOutput::Written {
            properties,
            iterations,
            converged,
        } => RankingResponse::Written {
            success: true,
            graph,
            properties,
            iterations,
            converged,
            processing_time_ms,
        },
        RankingOutput::PageRank { results } => RankingResponse::PageRank {
            graph,
            results,
            processing_time_ms,
        },
        RankingOutput::BiRank {
            persons,
            companies,
            iterations,
            converged,
        } => RankingResponse::BiRank {
            graph,
            persons,
            companies,
            iterations,
            converged,
            processing_time_ms,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_request_defaults() {
        let request: ProjectionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.graph_name.is_none());
        assert_eq!(request.weight_scheme, "count");
        assert!(!request.delete_existing);
    }

    #[test]
    fn rankings_query_defaults_limit() {
        let query: RankingsQuery =
            serde_json::from_str(r#"{"property_name": "birank_company"}"#).unwrap();
        assert_eq!(query.limit, 50);
        assert!(query.label.is_none());
    }

    #[test]
    fn rankings_query_parses_label() {
        let query: RankingsQuery = serde_json::from_str(
            r#"{"property_name": "birank_person", "label": "person", "limit": 5}"#,
        )
        .unwrap();
        assert_eq!(query.label, Some(NodeLabel::Person));
        assert_eq!(query.limit, 5);
    }

    #[test]
    fn unknown_weight_scheme_is_rejected() {
        let request: ProjectionRequest =
            serde_json::from_str(r#"{"weight_scheme": "quadratic"}"#).unwrap();
        assert!(WeightScheme::parse(&request.weight_scheme).is_err());
    }
}
