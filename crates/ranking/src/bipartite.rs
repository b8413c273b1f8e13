//! In-memory bipartite matrix for the talent-flow projection
//!
//! Explicit sparse representation of the person×company weight matrix W:
//! CSR storage (rows = persons) plus two dense index arenas mapping
//! store-issued node ids to contiguous internal indices. Built once per
//! ranking request from the streamed edge set and discarded after scoring.
//!
//! Construction is deterministic: node ids are sorted ascending before
//! index assignment and duplicate (person, company) entries are merged by
//! summing weight, so identical edge input (in any order) produces an
//! identical layout and bitwise-identical downstream arithmetic.

use std::collections::{BTreeMap, BTreeSet};
use talentflow_common::errors::{AppError, Result};
use talentflow_common::models::{NodeId, ProjectedEdge};

/// Sparse person×company weight matrix with id arenas
#[derive(Debug, Clone)]
pub struct BipartiteGraph {
    person_ids: Vec<NodeId>,
    company_ids: Vec<NodeId>,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    weights: Vec<f64>,
}

impl BipartiteGraph {
    /// Build from a projected edge set, inferring both node partitions
    /// from the edge endpoints.
    pub fn from_edges(edges: &[ProjectedEdge]) -> Self {
        let persons: BTreeSet<NodeId> = edges.iter().map(|e| e.source).collect();
        let companies: BTreeSet<NodeId> = edges.iter().map(|e| e.target).collect();
        // Node sets come straight from the edges, so every id resolves.
        Self::build(
            persons.into_iter().collect(),
            companies.into_iter().collect(),
            edges,
        )
        .expect("edge endpoints are present in inferred node sets")
    }

    /// Build from explicit node partitions plus edges. Admits isolated
    /// (degree-zero) nodes, which `from_edges` cannot observe. Fails if an
    /// edge references a node outside its partition.
    pub fn from_parts(
        person_ids: Vec<NodeId>,
        company_ids: Vec<NodeId>,
        edges: &[ProjectedEdge],
    ) -> Result<Self> {
        let mut persons = person_ids;
        let mut companies = company_ids;
        persons.sort_unstable();
        persons.dedup();
        companies.sort_unstable();
        companies.dedup();
        Self::build(persons, companies, edges)
    }

    fn build(
        person_ids: Vec<NodeId>,
        company_ids: Vec<NodeId>,
        edges: &[ProjectedEdge],
    ) -> Result<Self> {
        // Per-row ordered maps merge duplicate entries and fix the column
        // order independent of edge input order.
        let mut rows: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); person_ids.len()];

        for edge in edges {
            let row = person_ids
                .binary_search(&edge.source)
                .map_err(|_| AppError::Internal {
                    message: format!("Edge references unknown person node {}", edge.source),
                })?;
            let col = company_ids
                .binary_search(&edge.target)
                .map_err(|_| AppError::Internal {
                    message: format!("Edge references unknown company node {}", edge.target),
                })?;
            *rows[row].entry(col).or_insert(0.0) += edge.weight;
        }

        let nnz: usize = rows.iter().map(|r| r.len()).sum();
        let mut row_ptr = Vec::with_capacity(person_ids.len() + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        let mut weights = Vec::with_capacity(nnz);

        row_ptr.push(0);
        for row in &rows {
            for (&col, &weight) in row {
                col_idx.push(col);
                weights.push(weight);
            }
            row_ptr.push(col_idx.len());
        }

        Ok(Self {
            person_ids,
            company_ids,
            row_ptr,
            col_idx,
            weights,
        })
    }

    /// Number of persons (rows)
    pub fn person_count(&self) -> usize {
        self.person_ids.len()
    }

    /// Number of companies (columns)
    pub fn company_count(&self) -> usize {
        self.company_ids.len()
    }

    /// Number of distinct (person, company) entries
    pub fn edge_count(&self) -> usize {
        self.col_idx.len()
    }

    /// Store-issued ids for the person partition, in row order
    pub fn person_ids(&self) -> &[NodeId] {
        &self.person_ids
    }

    /// Store-issued ids for the company partition, in column order
    pub fn company_ids(&self) -> &[NodeId] {
        &self.company_ids
    }

    /// Row degree vector Du: Du[i] = Σ_j W[i,j]
    pub fn person_degrees(&self) -> Vec<f64> {
        let mut degrees = vec![0.0; self.person_ids.len()];
        for (row, degree) in degrees.iter_mut().enumerate() {
            for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                *degree += self.weights[k];
            }
        }
        degrees
    }

    /// Column degree vector Dp: Dp[j] = Σ_i W[i,j]
    pub fn company_degrees(&self) -> Vec<f64> {
        let mut degrees = vec![0.0; self.company_ids.len()];
        for k in 0..self.col_idx.len() {
            degrees[self.col_idx[k]] += self.weights[k];
        }
        degrees
    }

    /// Iterate non-zero entries as (row, col, weight)
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.person_ids.len()).flat_map(move |row| {
            (self.row_ptr[row]..self.row_ptr[row + 1])
                .map(move |k| (row, self.col_idx[k], self.weights[k]))
        })
    }

    /// Matrix-vector product W·x (x over companies, result over persons),
    /// with the matrix entries replaced by `entry_weights` (same CSR
    /// layout). Used with degree-normalized weights.
    pub fn multiply_with(&self, entry_weights: &[f64], x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(entry_weights.len(), self.weights.len());
        let mut out = vec![0.0; self.person_ids.len()];
        for (row, value) in out.iter_mut().enumerate() {
            for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                *value += entry_weights[k] * x[self.col_idx[k]];
            }
        }
        out
    }

    /// Transposed product Wᵗ·x (x over persons, result over companies)
    pub fn multiply_transpose_with(&self, entry_weights: &[f64], x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(entry_weights.len(), self.weights.len());
        let mut out = vec![0.0; self.company_ids.len()];
        for row in 0..self.person_ids.len() {
            for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                out[self.col_idx[k]] += entry_weights[k] * x[row];
            }
        }
        out
    }

    /// Raw CSR weights, in entry order
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: NodeId, target: NodeId, weight: f64) -> ProjectedEdge {
        ProjectedEdge { source, target, weight }
    }

    #[test]
    fn builds_sorted_arenas_and_degrees() {
        // P1: C1->C2, P2: C2->C3 collapsed under the count scheme
        let edges = vec![
            edge(20, 102, 1.0),
            edge(10, 101, 1.0),
            edge(10, 102, 1.0),
            edge(20, 103, 1.0),
        ];
        let graph = BipartiteGraph::from_edges(&edges);

        assert_eq!(graph.person_ids(), &[10, 20]);
        assert_eq!(graph.company_ids(), &[101, 102, 103]);
        assert_eq!(graph.person_degrees(), vec![2.0, 2.0]);
        assert_eq!(graph.company_degrees(), vec![1.0, 2.0, 1.0]);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn merges_duplicate_pairs_by_summing() {
        let edges = vec![edge(1, 5, 1.0), edge(1, 5, 1.0), edge(1, 5, 1.0)];
        let graph = BipartiteGraph::from_edges(&edges);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.person_degrees(), vec![3.0]);
    }

    #[test]
    fn layout_is_independent_of_edge_order() {
        let forward = vec![edge(1, 10, 2.0), edge(1, 11, 1.0), edge(2, 11, 4.0)];
        let mut shuffled = forward.clone();
        shuffled.reverse();

        let a = BipartiteGraph::from_edges(&forward);
        let b = BipartiteGraph::from_edges(&shuffled);
        assert_eq!(a.person_ids(), b.person_ids());
        assert_eq!(a.company_ids(), b.company_ids());
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn from_parts_admits_isolated_nodes() {
        let graph =
            BipartiteGraph::from_parts(vec![1], vec![10, 11], &[edge(1, 10, 1.0)]).unwrap();
        assert_eq!(graph.company_count(), 2);
        assert_eq!(graph.company_degrees(), vec![1.0, 0.0]);
    }

    #[test]
    fn from_parts_rejects_unknown_endpoints() {
        let result = BipartiteGraph::from_parts(vec![1], vec![10], &[edge(2, 10, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_edge_set_yields_empty_partitions() {
        let graph = BipartiteGraph::from_edges(&[]);
        assert_eq!(graph.person_count(), 0);
        assert_eq!(graph.company_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn products_agree_with_dense_arithmetic() {
        // W = [[2, 1], [0, 4]]
        let edges = vec![edge(1, 10, 2.0), edge(1, 11, 1.0), edge(2, 11, 4.0)];
        let graph = BipartiteGraph::from_edges(&edges);

        let wx = graph.multiply_with(graph.weights(), &[1.0, 2.0]);
        assert_eq!(wx, vec![4.0, 8.0]);

        let wtx = graph.multiply_transpose_with(graph.weights(), &[1.0, 2.0]);
        assert_eq!(wtx, vec![2.0, 9.0]);
    }
}
