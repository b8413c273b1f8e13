//! PageRank delegate
//!
//! Thin adapter around the store's built-in PageRank: shapes the request,
//! validates parameters before any store call, and joins node display
//! names onto the streamed rows. No algorithmic logic lives here; store
//! failures propagate unmodified.

use crate::projection::validate_graph_name;
use std::sync::Arc;
use talentflow_common::errors::{AppError, Result};
use talentflow_common::graph::{GraphStore, PageRankOptions};
use talentflow_common::models::{sort_ranked, NodeLabel, RankedNode};

/// Reject out-of-range PageRank parameters
pub fn validate_options(opts: &PageRankOptions) -> Result<()> {
    if !(opts.damping > 0.0 && opts.damping < 1.0) {
        return Err(AppError::Validation {
            message: format!("damping must lie in (0, 1), got {}", opts.damping),
            field: Some("damping".into()),
        });
    }
    if opts.iterations == 0 {
        return Err(AppError::Validation {
            message: "iterations must be at least 1".into(),
            field: Some("iterations".into()),
        });
    }
    Ok(())
}

pub struct PageRankDelegate {
    store: Arc<dyn GraphStore>,
}

impl PageRankDelegate {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Run the store's PageRank over a named projection.
    ///
    /// Write mode (`write_property` set) persists scores on nodes and
    /// returns `None`; stream mode returns `(id, name, score)` rows sorted
    /// descending by score, ties broken by ascending node id.
    pub async fn run(&self, name: &str, opts: &PageRankOptions) -> Result<Option<Vec<RankedNode>>> {
        validate_graph_name(name)?;
        validate_options(opts)?;

        let rows = self.store.run_page_rank(name, opts).await?;
        if opts.write_property.is_some() {
            return Ok(None);
        }

        let ids: Vec<_> = rows.iter().map(|r| r.node_id).collect();
        let names = self.store.resolve_node_names(&ids).await?;

        let mut ranked: Vec<RankedNode> = rows
            .into_iter()
            .map(|row| {
                let info = names.get(&row.node_id);
                RankedNode {
                    node_id: row.node_id,
                    name: info
                        .map(|i| i.name.clone())
                        .unwrap_or_else(|| format!("Node_{}", row.node_id)),
                    label: info.map(|i| i.label).unwrap_or(NodeLabel::Company),
                    score: row.score,
                }
            })
            .collect();
        sort_ranked(&mut ranked);
        Ok(Some(ranked))
    }
}
