//! TalentFlow Ranking Core
//!
//! Collapses the person→transition→company graph held in the external
//! store into a weighted bipartite projection and computes influence
//! scores over it:
//!
//! - [`projection`] builds the bipartite projection under a selectable
//!   weighting scheme
//! - [`pagerank`] delegates to the store's built-in PageRank
//! - [`bipartite`] + [`birank`] implement the in-process BiRank engine
//!   (degree-normalized alternating power iteration)
//! - [`scores`] persists or streams ranking output
//! - [`service`] ties the pieces together behind one ranking capability

pub mod bipartite;
pub mod birank;
pub mod pagerank;
pub mod projection;
pub mod scores;
pub mod service;

#[cfg(test)]
pub(crate) mod test_store;

pub use bipartite::BipartiteGraph;
pub use birank::{safe_inv_sqrt, BiRankConfig, BiRankOutcome, BiRankScorer};
pub use pagerank::PageRankDelegate;
pub use projection::ProjectionBuilder;
pub use scores::ScoreStore;
pub use service::{BipartiteRanker, RankingOutput, RankingService};
