//! Dense shortest-path-distance table over the social graph

use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis};
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Serialize, Deserialize};

use crate::error::PrepError;
use crate::graph::SocialGraph;

/// Distance stored for pairs with no connecting path
pub const UNREACHABLE: i64 = -1;

/// Distance reported at sentinel (`0`) positions of a walk.
///
/// Sentinel rows and columns read this constant rather than the last user's
/// row that a negative-index gather at `0 - 1` would return.
pub const SENTINEL_DISTANCE: i64 = 0;

/// Dense `[users x users]` matrix of shortest-path distances, indexed by
/// `user_id - 1`. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpdTable {
    dist: Array2<i64>,
}

impl SpdTable {
    /// Wrap an externally supplied distance matrix
    pub fn from_array(dist: Array2<i64>) -> Result<Self, PrepError> {
        let (rows, cols) = dist.dim();
        if rows != cols {
            return Err(PrepError::InvalidConfig(format!(
                "spd table must be square, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self { dist })
    }

    /// Unit-weight shortest paths between every pair of ids `1..=graph.max_id()`.
    ///
    /// Sources are processed in parallel, each writing its own row of the
    /// result in place. Memory is O(users²).
    pub fn compute(graph: &SocialGraph) -> Self {
        let n = graph.max_id() as usize;
        log::info!("Computing shortest paths for {} users", n);

        let mut pg: UnGraph<(), ()> = UnGraph::with_capacity(n, graph.edge_count());
        for _ in 0..n {
            pg.add_node(());
        }
        for a in graph.nodes() {
            for &b in graph.neighbors(a) {
                if a < b {
                    pg.add_edge(NodeIndex::new(a as usize - 1), NodeIndex::new(b as usize - 1), ());
                }
            }
        }

        let mut dist = Array2::from_elem((n, n), UNREACHABLE);
        dist.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(source, mut row)| {
                for (target, d) in dijkstra(&pg, NodeIndex::new(source), None, |_| 1i64) {
                    row[target.index()] = d;
                }
            });

        Self { dist }
    }

    /// Number of users covered
    pub fn num_users(&self) -> usize {
        self.dist.nrows()
    }

    /// Distance between two (1-based) user ids
    pub fn distance(&self, a: u32, b: u32) -> Result<i64, PrepError> {
        let (ia, ib) = (self.index_of(a)?, self.index_of(b)?);
        Ok(self.dist[[ia, ib]])
    }

    /// Gather the `[len x len]` sub-matrix for a walk, rows and columns in walk
    /// order. Repeated ids gather the same row again; sentinel positions read
    /// `SENTINEL_DISTANCE`.
    pub fn gather(&self, nodes: &[u32]) -> Result<Array2<i64>, PrepError> {
        let indices = nodes.iter()
            .map(|&node| if node == 0 { Ok(None) } else { self.index_of(node).map(Some) })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Array2::from_shape_fn((nodes.len(), nodes.len()), |(i, j)| {
            match (indices[i], indices[j]) {
                (Some(a), Some(b)) => self.dist[[a, b]],
                _ => SENTINEL_DISTANCE,
            }
        }))
    }

    fn index_of(&self, node: u32) -> Result<usize, PrepError> {
        let idx = (node as usize).wrapping_sub(1);
        if node == 0 || idx >= self.num_users() {
            return Err(PrepError::IndexOutOfRange {
                table: "spd table",
                index: node as usize,
                len: self.num_users(),
            });
        }
        Ok(idx)
    }
}
