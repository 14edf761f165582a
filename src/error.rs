//! Error taxonomy for the data-preparation core

use thiserror::Error;

/// Data-consistency errors raised by the graph, walk and assembly stages.
///
/// A walk that runs into a dead end is not an error; it is encoded with the
/// `0` sentinel and handled as ordinary data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepError {
    /// Referenced anchor or node is absent from the social graph.
    #[error("node {0} is not present in the social graph")]
    InvalidGraph(u32),

    /// A walk references a user with no entry in the interaction index.
    #[error("user {0} has no entry in the interaction index")]
    MissingInteraction(u32),

    /// A dense table does not cover a referenced id.
    #[error("{table} does not cover index {index} (size {len})")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        len: usize,
    },

    /// Rejected configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
