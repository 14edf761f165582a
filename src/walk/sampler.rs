//! Second-order biased random walks over the social graph
//!
//! A step from `current` with a known `previous` node draws from:
//!
//! ```text
//! P(previous)  = β
//! P(candidate) = (1 - β) / |neighbors(current) \ {previous}|
//! ```
//!
//! The first step has no previous node and is uniform over the anchor's
//! neighbors. When `neighbors(current) \ {previous}` is empty the walk hits a
//! dead end and is padded with the `0` sentinel from there on, even if
//! `β > 0` would allow stepping back.
//!
//! Revisiting any node already on the walk is rejected and resampled. After
//! `max_retries` rejections within one walk the next rejection pads the walk
//! with `0`, which bounds the cost of every walk.

use rand::prelude::*;
use rayon::prelude::*;

use crate::error::PrepError;
use crate::graph::{DegreeIndex, SocialGraph};
use crate::walk::{walk_rng, Walk};

/// Rejections tolerated per walk before it is padded with the sentinel
pub const MAX_DUPLICATE_RETRIES: usize = 10;

/// Parameters for biased walk generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkConfig {
    /// Number of positions in every walk, anchor included
    pub walk_length: usize,
    /// Probability of stepping back to the previous node (β)
    pub return_bias: f64,
    /// Duplicate-node rejections tolerated per walk
    pub max_retries: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            walk_length: 50,
            return_bias: 0.1,
            max_retries: MAX_DUPLICATE_RETRIES,
        }
    }
}

impl WalkConfig {
    pub fn new(walk_length: usize, return_bias: f64) -> Result<Self, PrepError> {
        if walk_length == 0 {
            return Err(PrepError::InvalidConfig("walk_length must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&return_bias) {
            return Err(PrepError::InvalidConfig(format!(
                "return bias must be in [0, 1], got {}",
                return_bias
            )));
        }
        Ok(Self { walk_length, return_bias, ..Self::default() })
    }
}

/// Generates fixed-length, degree-annotated walks from anchor nodes
pub struct BiasedWalkSampler<'a> {
    graph: &'a SocialGraph,
    degrees: &'a DegreeIndex,
    config: WalkConfig,
}

impl<'a> BiasedWalkSampler<'a> {
    pub fn new(graph: &'a SocialGraph, degrees: &'a DegreeIndex, config: WalkConfig) -> Self {
        Self { graph, degrees, config }
    }

    /// Draw the node after `current`, or `0` at a dead end.
    ///
    /// `return_bias` only applies when there is a previous node.
    pub fn next_node<R: Rng + ?Sized>(
        &self,
        previous: Option<u32>,
        current: u32,
        return_bias: f64,
        rng: &mut R,
    ) -> u32 {
        let neighbors = self.graph.neighbors(current);
        let excluded = previous.map_or(0, |prev| usize::from(neighbors.binary_search(&prev).is_ok()));
        let candidate_count = neighbors.len() - excluded;

        if candidate_count == 0 {
            return 0;
        }

        if let Some(prev) = previous {
            if rng.random::<f64>() < return_bias {
                return prev;
            }
        }

        let pick = rng.random_range(0..candidate_count);
        neighbors.iter()
            .copied()
            .filter(|&node| Some(node) != previous)
            .nth(pick)
            .unwrap_or(0)
    }

    /// Walk from one anchor using the supplied generator
    pub fn sample_walk<R: Rng + ?Sized>(&self, anchor: u32, rng: &mut R) -> Result<Walk, PrepError> {
        let return_bias = self.config.return_bias;
        self.walk_from(anchor, |previous, current| {
            self.next_node(previous, current, return_bias, &mut *rng)
        })
    }

    /// Grow a walk from `anchor`, asking `step(previous, current)` for every
    /// candidate next node. Candidates already on the walk count as rejections.
    fn walk_from<F>(&self, anchor: u32, mut step: F) -> Result<Walk, PrepError>
    where
        F: FnMut(Option<u32>, u32) -> u32,
    {
        if !self.graph.contains(anchor) {
            return Err(PrepError::InvalidGraph(anchor));
        }

        let length = self.config.walk_length;
        let mut nodes = Vec::with_capacity(length);
        nodes.push(anchor);

        let mut rejections = 0;
        while nodes.len() < length {
            let current = nodes[nodes.len() - 1];

            if current == 0 {
                // Sentinel is absorbing
                nodes.resize(length, 0);
                break;
            }

            let previous = nodes.len().checked_sub(2).map(|i| nodes[i]);
            let next = step(previous, current);

            if next != 0 && nodes.contains(&next) {
                rejections += 1;
                if rejections > self.config.max_retries {
                    nodes.push(0);
                }
            } else {
                nodes.push(next);
            }
        }

        let degrees = nodes.iter()
            .map(|&node| self.degrees.degree_of(node))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Walk { anchor, nodes, degrees })
    }

    /// Walk from every anchor in parallel.
    ///
    /// Anchor `i` draws from stream `i` of the generator seeded with `seed`, so
    /// the result does not depend on the number of worker threads.
    pub fn sample_walks(&self, anchors: &[u32], seed: u64) -> Result<Vec<Walk>, PrepError> {
        log::info!(
            "Generating {} walks of length {} (return bias {})",
            anchors.len(),
            self.config.walk_length,
            self.config.return_bias
        );

        anchors.par_iter()
            .enumerate()
            .map(|(index, &anchor)| {
                let mut rng = walk_rng(seed, index as u64);
                self.sample_walk(anchor, &mut rng)
            })
            .collect()
    }
}
