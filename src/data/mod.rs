//! Rating / trust data loading and the per-split lookup tables built from it

pub mod tables;
pub mod preprocessing;
pub mod split;
pub mod interactions;
pub mod ratings;

use serde::{Serialize, Deserialize};

pub use interactions::{Interaction, InteractionIndex};
pub use ratings::RatingMatrix;
pub use split::DatasetSplit;

/// One row of the rating table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRow {
    pub user_id: u32,
    pub item_id: u32,
    pub rating: u16,
}
