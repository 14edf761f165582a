//! Graph construction module

use crate::error::PrepError;
use crate::graph::SocialGraph;

/// Builder for incrementally constructing a SocialGraph from trust edges
pub struct GraphBuilder {
    /// Adjacency lists indexed by user id (slot 0 stays empty)
    adjacency_lists: Vec<Vec<u32>>,

    /// Ids seen in any edge
    present: Vec<bool>,
}

impl GraphBuilder {
    /// Create a new graph builder able to hold ids up to `max_id` without growing
    pub fn with_capacity(max_id: usize) -> Self {
        Self {
            adjacency_lists: Vec::with_capacity(max_id + 1),
            present: Vec::with_capacity(max_id + 1),
        }
    }

    /// Build a graph straight from an edge list
    pub fn from_edges<I>(edges: I) -> Result<SocialGraph, PrepError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut builder = Self::with_capacity(0);
        for (a, b) in edges {
            builder.add_edge(a, b)?;
        }
        Ok(builder.build())
    }

    /// Register a node, growing the id space as needed
    pub fn add_node(&mut self, id: u32) -> Result<(), PrepError> {
        if id == 0 {
            return Err(PrepError::InvalidGraph(0));
        }

        let idx = id as usize;
        if idx >= self.adjacency_lists.len() {
            self.adjacency_lists.resize_with(idx + 1, Vec::new);
            self.present.resize(idx + 1, false);
        }
        self.present[idx] = true;

        Ok(())
    }

    /// Add an undirected edge. Self-loops register the node but add no neighbor.
    pub fn add_edge(&mut self, a: u32, b: u32) -> Result<(), PrepError> {
        self.add_node(a)?;
        self.add_node(b)?;

        if a == b {
            return Ok(());
        }

        self.adjacency_lists[a as usize].push(b);
        self.adjacency_lists[b as usize].push(a);

        Ok(())
    }

    /// Build the compressed graph
    pub fn build(mut self) -> SocialGraph {
        // Collapse duplicate and reversed edges into one neighbor entry
        for list in &mut self.adjacency_lists {
            list.sort_unstable();
            list.dedup();
        }

        let edge_count: usize = self.adjacency_lists.iter().map(|list| list.len()).sum();
        let max_id = self.adjacency_lists.len().saturating_sub(1);

        let mut graph = SocialGraph::with_capacity(max_id, edge_count / 2);

        graph.offsets.push(0);
        let mut offset = 0;
        for list in &self.adjacency_lists {
            offset += list.len() as u32;
            graph.offsets.push(offset);
            graph.edges.extend_from_slice(list);
        }
        graph.present = self.present;

        log::debug!(
            "Built social graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        graph
    }
}
