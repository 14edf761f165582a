//! Id remapping and per-split edge filtering

use std::collections::{HashMap, HashSet};

use crate::data::RatingRow;

/// Rating and trust tables after id remapping
#[derive(Debug, Clone, PartialEq)]
pub struct RemappedData {
    pub ratings: Vec<RatingRow>,
    pub trust: Vec<(u32, u32)>,
    pub user_count: usize,
    pub item_count: usize,
}

/// Assign ids 1.. in order of first appearance
fn dense_ids<I: IntoIterator<Item = u32>>(ids: I) -> HashMap<u32, u32> {
    let mut mapping = HashMap::new();
    for id in ids {
        let next = mapping.len() as u32 + 1;
        mapping.entry(id).or_insert(next);
    }
    mapping
}

/// Drop ratings from users outside the trust network and renumber users and
/// items densely from 1.
///
/// Users are numbered in the order they first appear in the trust table
/// (`user_id_1` before `user_id_2` within a row); items in the order they
/// first appear among the surviving ratings.
pub fn remap_ids(ratings: &[RatingRow], trust: &[(u32, u32)]) -> RemappedData {
    let user_map = dense_ids(trust.iter().flat_map(|&(a, b)| [a, b]));

    let kept: Vec<&RatingRow> = ratings.iter()
        .filter(|row| user_map.contains_key(&row.user_id))
        .collect();

    log::info!(
        "Keeping {} of {} ratings from {} social users",
        kept.len(),
        ratings.len(),
        user_map.len()
    );

    let item_map = dense_ids(kept.iter().map(|row| row.item_id));

    let ratings = kept.into_iter()
        .map(|row| RatingRow {
            user_id: user_map[&row.user_id],
            item_id: item_map[&row.item_id],
            rating: row.rating,
        })
        .collect();

    let trust = trust.iter()
        .map(|&(a, b)| (user_map[&a], user_map[&b]))
        .collect();

    RemappedData {
        ratings,
        trust,
        user_count: user_map.len(),
        item_count: item_map.len(),
    }
}

/// Users that rated at least one item in a split
pub fn active_users(ratings: &[RatingRow]) -> HashSet<u32> {
    ratings.iter().map(|row| row.user_id).collect()
}

/// Keep only trust edges whose two endpoints are both in `users`
pub fn filter_edges_to_users(trust: &[(u32, u32)], users: &HashSet<u32>) -> Vec<(u32, u32)> {
    trust.iter()
        .copied()
        .filter(|(a, b)| users.contains(a) && users.contains(b))
        .collect()
}
