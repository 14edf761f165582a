//! Memory-efficient undirected social graph

use std::mem;
use serde::{Serialize, Deserialize};

/// Compressed sparse representation of the undirected trust network.
///
/// Nodes are addressed by their (dense, positive) user id directly; id `0`
/// is the "no node" sentinel and never has neighbors. Every undirected edge
/// is stored in both adjacency lists, and each list is sorted and free of
/// duplicates, so a node's slice is its neighbor set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialGraph {
    /// Offset array: offsets[i] to offsets[i+1] is the neighbor range of node i
    pub offsets: Vec<u32>,

    /// Concatenated, per-node sorted neighbor lists
    pub edges: Vec<u32>,

    /// Whether an id appeared in the edge list the graph was built from
    pub present: Vec<bool>,
}

impl SocialGraph {
    /// Create an empty graph with pre-allocated capacity
    pub fn with_capacity(max_id: usize, edge_count: usize) -> Self {
        Self {
            offsets: Vec::with_capacity(max_id + 2),
            edges: Vec::with_capacity(edge_count * 2),
            present: Vec::with_capacity(max_id + 1),
        }
    }

    /// Largest id the graph has a slot for
    pub fn max_id(&self) -> u32 {
        self.present.len().saturating_sub(1) as u32
    }

    /// Whether `node` is a member of the graph
    pub fn contains(&self, node: u32) -> bool {
        node != 0 && self.present.get(node as usize).copied().unwrap_or(false)
    }

    /// Neighbor set of a node (empty for unknown ids and the sentinel)
    pub fn neighbors(&self, node: u32) -> &[u32] {
        let idx = node as usize;
        if idx + 1 >= self.offsets.len() {
            return &[];
        }
        let start = self.offsets[idx] as usize;
        let end = self.offsets[idx + 1] as usize;
        &self.edges[start..end]
    }

    /// Number of distinct neighbors
    pub fn degree(&self, node: u32) -> usize {
        self.neighbors(node).len()
    }

    /// Check if `a` and `b` are adjacent
    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Member ids in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = u32> + '_ {
        self.present.iter()
            .enumerate()
            .filter(|(_, &present)| present)
            .map(|(id, _)| id as u32)
    }

    pub fn node_count(&self) -> usize {
        self.present.iter().filter(|&&present| present).count()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let edges = self.edges.capacity() * mem::size_of::<u32>();
        let present = self.present.capacity() * mem::size_of::<bool>();

        base + offsets + edges + present
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphBuilder;

    #[test]
    fn test_path_graph_queries() {
        let graph = GraphBuilder::from_edges([(1, 2), (2, 3), (3, 4)]).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(2), &[1, 3]);
        assert_eq!(graph.degree(4), 1);
        assert!(graph.has_edge(3, 2));
        assert!(!graph.has_edge(1, 3));
        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_sentinel_and_unknown_ids() {
        let graph = GraphBuilder::from_edges([(2, 5)]).unwrap();

        assert!(!graph.contains(0));
        assert!(!graph.contains(1));
        assert!(!graph.contains(99));
        assert!(graph.neighbors(0).is_empty());
        assert!(graph.neighbors(99).is_empty());
        assert_eq!(graph.max_id(), 5);
    }
}
