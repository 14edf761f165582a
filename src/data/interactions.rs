//! Per-user interacted-item lists

use std::collections::HashMap;

use serde::{Serialize, Deserialize};

use crate::data::RatingRow;
use crate::error::PrepError;
use crate::graph::DegreeIndex;

/// Number of zero placeholder entries stored for the sentinel user `0`
pub const SENTINEL_ENTRIES: usize = 4;

/// One rated item of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub item_id: u32,
    pub rating: u16,
    pub item_degree: u32,
}

impl Interaction {
    pub const PLACEHOLDER: Interaction = Interaction { item_id: 0, rating: 0, item_degree: 0 };
}

/// Maps a user to the items they rated, in rating-table row order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionIndex {
    by_user: HashMap<u32, Vec<Interaction>>,
}

impl InteractionIndex {
    /// Group a split's ratings by user, annotating each item with its popularity
    pub fn build(rows: &[RatingRow], item_degrees: &DegreeIndex) -> Result<Self, PrepError> {
        let mut by_user: HashMap<u32, Vec<Interaction>> = HashMap::new();

        for row in rows {
            let item_degree = item_degrees.degree_of(row.item_id)?;
            by_user.entry(row.user_id).or_default().push(Interaction {
                item_id: row.item_id,
                rating: row.rating,
                item_degree,
            });
        }

        Ok(Self::from_lists(by_user))
    }

    /// Build from ready-made per-user lists; the sentinel row is added if absent
    pub fn from_lists<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = (u32, Vec<Interaction>)>,
    {
        let mut by_user: HashMap<u32, Vec<Interaction>> = lists.into_iter().collect();
        by_user.entry(0)
            .or_insert_with(|| vec![Interaction::PLACEHOLDER; SENTINEL_ENTRIES]);

        Self { by_user }
    }

    pub fn get(&self, user: u32) -> Option<&[Interaction]> {
        self.by_user.get(&user).map(Vec::as_slice)
    }

    /// Items of a user, failing for users outside the index
    pub fn items_of(&self, user: u32) -> Result<&[Interaction], PrepError> {
        self.get(user).ok_or(PrepError::MissingInteraction(user))
    }

    /// Number of users, sentinel included
    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}
