//! BiRank: degree-balanced mutual-reinforcement ranking
//!
//! Computes mutually reinforcing scores for both partitions of the
//! bipartite talent-flow graph via alternating power iteration over the
//! symmetric degree-normalized matrix
//!
//! ```text
//! S = diag(Du^-1/2) · W · diag(Dp^-1/2)
//!
//! p ← α · Sᵗ·u + (1 − α) · p0
//! u ← β · S·p  + (1 − β) · u0
//! ```
//!
//! with uniform restart vectors `u0 = 1/m`, `p0 = 1/n`. Iteration stops
//! when the L∞ delta of both vectors drops below the tolerance, or at the
//! iteration cap (best-effort result, flagged via `converged: false`).
//!
//! The output is a relevance score, not a probability distribution: with
//! damping below 1 the restart terms reintroduce mass independently per
//! partition, and the drift is preserved rather than renormalized.

use crate::bipartite::BipartiteGraph;
use talentflow_common::errors::{AppError, Result};

/// Guarded inverse square root: `0` for non-positive input.
///
/// Keeps isolated (degree-zero) nodes out of propagation instead of
/// producing a division-by-zero: their row/column in S is zero, so they
/// receive only the restart term each iteration.
pub fn safe_inv_sqrt(x: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        x.powf(-0.5)
    }
}

/// BiRank parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiRankConfig {
    /// Company-side damping, must lie in (0, 1]
    pub alpha: f64,

    /// Person-side damping, must lie in (0, 1]
    pub beta: f64,

    /// Iteration cap; termination is guaranteed by this bound
    pub max_iter: u32,

    /// L∞ convergence tolerance
    pub tolerance: f64,
}

impl Default for BiRankConfig {
    fn default() -> Self {
        Self {
            alpha: 0.85,
            beta: 0.85,
            max_iter: 100,
            tolerance: 1e-6,
        }
    }
}

impl BiRankConfig {
    /// Reject out-of-range parameters before any computation begins
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(AppError::Validation {
                message: format!("alpha must lie in (0, 1], got {}", self.alpha),
                field: Some("alpha".into()),
            });
        }
        if !(self.beta > 0.0 && self.beta <= 1.0) {
            return Err(AppError::Validation {
                message: format!("beta must lie in (0, 1], got {}", self.beta),
                field: Some("beta".into()),
            });
        }
        if self.max_iter == 0 {
            return Err(AppError::Validation {
                message: "max_iter must be at least 1".into(),
                field: Some("max_iter".into()),
            });
        }
        if !(self.tolerance > 0.0) {
            return Err(AppError::Validation {
                message: format!("tolerance must be positive, got {}", self.tolerance),
                field: Some("tolerance".into()),
            });
        }
        Ok(())
    }
}

/// Result of a BiRank computation
#[derive(Debug, Clone, PartialEq)]
pub struct BiRankOutcome {
    /// Scores for the person partition, in `BipartiteGraph::person_ids` order
    pub person_scores: Vec<f64>,

    /// Scores for the company partition, in `BipartiteGraph::company_ids` order
    pub company_scores: Vec<f64>,

    /// Iterations actually performed
    pub iterations: u32,

    /// False when the iteration cap was reached before the tolerance was
    /// satisfied; the scores are then best-effort, not converged.
    pub converged: bool,
}

/// BiRank scorer over an in-memory bipartite graph
pub struct BiRankScorer {
    config: BiRankConfig,
}

impl BiRankScorer {
    /// Create a scorer with validated parameters
    pub fn new(config: BiRankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BiRankConfig {
        &self.config
    }

    /// Compute BiRank scores for both partitions.
    ///
    /// Deterministic: fixed node ordering and sequential accumulation make
    /// the result bit-for-bit reproducible for identical inputs. An empty
    /// or all-zero matrix short-circuits to the uniform restart vectors.
    pub fn compute(&self, graph: &BipartiteGraph) -> BiRankOutcome {
        let m = graph.person_count();
        let n = graph.company_count();

        let u0: Vec<f64> = vec![1.0 / m.max(1) as f64; m];
        let p0: Vec<f64> = vec![1.0 / n.max(1) as f64; n];

        let du = graph.person_degrees();
        let dp = graph.company_degrees();

        // Empty projection, or nodes with no usable weight anywhere:
        // nothing propagates, so the restart vectors are already the fixed
        // point.
        if m == 0 || n == 0 || du.iter().all(|&d| d <= 0.0) {
            return BiRankOutcome {
                person_scores: u0,
                company_scores: p0,
                iterations: 0,
                converged: true,
            };
        }

        let inv_du: Vec<f64> = du.iter().map(|&d| safe_inv_sqrt(d)).collect();
        let inv_dp: Vec<f64> = dp.iter().map(|&d| safe_inv_sqrt(d)).collect();

        // Entries of S in CSR order: s = w / sqrt(Du[i] * Dp[j])
        let scaled: Vec<f64> = graph
            .entries()
            .map(|(row, col, weight)| weight * inv_du[row] * inv_dp[col])
            .collect();

        let alpha = self.config.alpha;
        let beta = self.config.beta;

        let mut u = u0.clone();
        let mut p = p0.clone();
        let mut iterations = 0;
        let mut converged = false;

        for iter in 1..=self.config.max_iter {
            let mut p_next = graph.multiply_transpose_with(&scaled, &u);
            for (next, restart) in p_next.iter_mut().zip(&p0) {
                *next = alpha * *next + (1.0 - alpha) * restart;
            }

            let mut u_next = graph.multiply_with(&scaled, &p_next);
            for (next, restart) in u_next.iter_mut().zip(&u0) {
                *next = beta * *next + (1.0 - beta) * restart;
            }

            let delta = linf_delta(&p_next, &p).max(linf_delta(&u_next, &u));
            p = p_next;
            u = u_next;
            iterations = iter;

            if delta < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                max_iter = self.config.max_iter,
                tolerance = self.config.tolerance,
                "BiRank hit the iteration cap before converging; returning best-effort scores"
            );
        }

        BiRankOutcome {
            person_scores: u,
            company_scores: p,
            iterations,
            converged,
        }
    }
}

fn linf_delta(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
