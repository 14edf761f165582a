//! Final per-anchor training records

pub mod assembler;

use ndarray::Array2;
use serde::{Serialize, Deserialize};

pub use assembler::{chunk_padded, pool_items, PooledItem, SequenceAssembler};

/// One model input: a walk neighborhood paired with one chunk of the items
/// its members rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecord {
    /// Anchor user the walk started from
    pub anchor: u32,

    /// Walk node ids, `walk_length` long
    pub walk: Vec<u32>,

    /// Social degree per walk position
    pub walk_degrees: Vec<u32>,

    /// Item ids of this chunk, `item_seq_len` long, zero-padded
    pub items: Vec<u32>,

    /// Item popularity per chunk position, zero-padded
    pub item_degrees: Vec<u32>,

    /// `[walk_length x item_seq_len]` ratings of chunk items by walk members
    pub ratings: Array2<u16>,

    /// `[walk_length x walk_length]` shortest-path distances between walk positions
    pub spd: Array2<i64>,
}
