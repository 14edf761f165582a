//! Degree lookup tables

use std::collections::{HashMap, HashSet};

use serde::{Serialize, Deserialize};

use crate::error::PrepError;
use crate::graph::SocialGraph;

/// Maps an id to its degree: neighbor count for users in the social graph,
/// distinct-rater count for items in the bipartite rating graph.
///
/// Dense storage indexed by id. The sentinel id `0` always reads degree 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeIndex {
    degrees: Vec<Option<u32>>,
}

impl DegreeIndex {
    /// Build from explicit `(id, degree)` rows, e.g. a persisted degree table
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut degrees: Vec<Option<u32>> = Vec::new();
        for (id, degree) in entries {
            let idx = id as usize;
            if idx >= degrees.len() {
                degrees.resize(idx + 1, None);
            }
            degrees[idx] = Some(degree);
        }
        Self { degrees }
    }

    /// Social degree of every node in the graph
    pub fn from_graph(graph: &SocialGraph) -> Self {
        Self::from_entries(graph.nodes().map(|node| (node, graph.degree(node) as u32)))
    }

    /// Item popularity: number of distinct users who rated each item
    pub fn item_popularity<I>(interactions: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut raters: HashMap<u32, HashSet<u32>> = HashMap::new();
        for (user, item) in interactions {
            raters.entry(item).or_default().insert(user);
        }

        Self::from_entries(raters.into_iter().map(|(item, users)| (item, users.len() as u32)))
    }

    /// Degree of an id if it has an entry
    pub fn get(&self, id: u32) -> Option<u32> {
        if id == 0 {
            return Some(0);
        }
        self.degrees.get(id as usize).copied().flatten()
    }

    /// Degree of an id, 0 for the sentinel, an error for ids without an entry
    pub fn degree_of(&self, id: u32) -> Result<u32, PrepError> {
        self.get(id).ok_or(PrepError::IndexOutOfRange {
            table: "degree index",
            index: id as usize,
            len: self.degrees.len(),
        })
    }

    /// `(id, degree)` rows in ascending id order
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.degrees.iter()
            .enumerate()
            .filter_map(|(id, degree)| degree.map(|d| (id as u32, d)))
    }

    /// Number of ids with an entry
    pub fn len(&self) -> usize {
        self.degrees.iter().filter(|d| d.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
