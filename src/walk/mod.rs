//! Random-walk sequences over the social graph

pub mod sampler;

use itertools::repeat_n;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};

use crate::graph::SocialGraph;

pub use sampler::{BiasedWalkSampler, WalkConfig, MAX_DUPLICATE_RETRIES};

/// A fixed-length walk from one anchor with the degree of every position.
///
/// Once a `0` appears in `nodes`, every later position is `0` as well, and
/// sentinel positions carry degree `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walk {
    pub anchor: u32,
    pub nodes: Vec<u32>,
    pub degrees: Vec<u32>,
}

impl Walk {
    /// Number of non-sentinel positions
    pub fn effective_len(&self) -> usize {
        self.nodes.iter().take_while(|&&node| node != 0).count()
    }

    /// Whether the walk ran into a dead end or the retry cap
    pub fn is_exhausted(&self) -> bool {
        self.nodes.last() == Some(&0)
    }
}

/// Generator for walk `index` of a run: the run seed picks the key and the
/// index picks an independent ChaCha stream.
pub fn walk_rng(seed: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index);
    rng
}

/// Pick anchors without replacement and repeat each one `repeat` times in a row.
///
/// `num_anchors = None` selects every node (in shuffled order); larger
/// requests are capped at the node count.
pub fn select_anchors(
    graph: &SocialGraph,
    num_anchors: Option<usize>,
    repeat: usize,
    seed: u64,
) -> Vec<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut nodes: Vec<u32> = graph.nodes().collect();
    nodes.shuffle(&mut rng);

    let count = num_anchors.map_or(nodes.len(), |n| n.min(nodes.len()));
    nodes.truncate(count);

    nodes.into_iter()
        .flat_map(|anchor| repeat_n(anchor, repeat))
        .collect()
}

/// Order a walk table by anchor, keeping generation order among equal anchors
pub fn sort_by_anchor(walks: &mut [Walk]) {
    walks.sort_by_key(|walk| walk.anchor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use std::collections::HashSet;

    fn star() -> SocialGraph {
        GraphBuilder::from_edges((2..=9).map(|leaf| (1, leaf))).unwrap()
    }

    #[test]
    fn test_select_all_nodes_repeated() {
        let anchors = select_anchors(&star(), None, 3, 42);

        assert_eq!(anchors.len(), 27);
        for chunk in anchors.chunks(3) {
            assert!(chunk.iter().all(|&a| a == chunk[0]));
        }
        let distinct: HashSet<u32> = anchors.iter().copied().collect();
        assert_eq!(distinct, (1..=9).collect::<HashSet<u32>>());
    }

    #[test]
    fn test_select_subset_without_replacement() {
        let anchors = select_anchors(&star(), Some(4), 1, 7);
        let distinct: HashSet<u32> = anchors.iter().copied().collect();

        assert_eq!(anchors.len(), 4);
        assert_eq!(distinct.len(), 4);
        assert_eq!(select_anchors(&star(), Some(100), 1, 7).len(), 9);
        assert_eq!(anchors, select_anchors(&star(), Some(4), 1, 7));
    }

    #[test]
    fn test_walk_summaries() {
        let walk = Walk { anchor: 3, nodes: vec![3, 4, 0, 0], degrees: vec![2, 1, 0, 0] };
        assert_eq!(walk.effective_len(), 2);
        assert!(walk.is_exhausted());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut walks = vec![
            Walk { anchor: 2, nodes: vec![2, 1], degrees: vec![1, 1] },
            Walk { anchor: 1, nodes: vec![1, 0], degrees: vec![1, 0] },
            Walk { anchor: 2, nodes: vec![2, 3], degrees: vec![1, 1] },
        ];
        sort_by_anchor(&mut walks);

        let order: Vec<&[u32]> = walks.iter().map(|w| w.nodes.as_slice()).collect();
        assert_eq!(order, vec![&[1, 0][..], &[2, 1][..], &[2, 3][..]]);
    }

    #[test]
    fn test_walk_streams_differ_per_index() {
        let first = |seed, index| walk_rng(seed, index).next_u64();

        assert_ne!(first(42, 0), first(42, 1));
        assert_ne!(first(42, 0), first(43, 0));
        assert_eq!(first(42, 5), first(42, 5));
    }
}
