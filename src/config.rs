//! Configuration management for the sequence data preparation run

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Largest accepted return parameter; `return_param / 10` is the return bias.
pub const MAX_RETURN_PARAM: u8 = 10;

/// Dataset partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }

    /// How many independent walks each anchor receives in this split
    pub fn repeat_count(&self, config: &Config) -> usize {
        match self {
            Split::Train => config.train_repeat,
            Split::Valid | Split::Test => 1,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "valid" => Ok(Split::Valid),
            "test" => Ok(Split::Test),
            other => Err(PrepError::InvalidConfig(format!("unknown split '{}'", other))),
        }
    }
}

/// Configuration for one preparation run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding every input table and produced artifact
    pub data_dir: PathBuf,

    /// Raw rating table to remap before splitting (optional)
    pub raw_ratings: Option<PathBuf>,

    /// Raw trust table to remap before splitting (optional)
    pub raw_trust: Option<PathBuf>,

    /// Precomputed `.npy` shortest-path table used instead of computing one
    pub spd_table: Option<PathBuf>,

    /// Precomputed `.npy` rating matrix used instead of building one
    pub rating_matrix: Option<PathBuf>,

    /// Seed driving the split, anchor selection and every walk
    pub seed: u64,

    /// Fraction of ratings held out for each of test and valid
    pub test_ratio: f64,

    /// Number of nodes per walk (encoder input length)
    pub walk_length: usize,

    /// Number of items per record (decoder input length)
    pub item_seq_len: usize,

    /// Return parameter in 0..=10
    pub return_param: u8,

    /// Number of anchors to sample; `None` walks from every node
    pub num_anchors: Option<usize>,

    /// Walks per anchor in the training split
    pub train_repeat: usize,

    /// Splits to process after splitting
    pub splits: Vec<Split>,

    /// Regenerate walk tables even if one already exists
    pub force_walks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("dataset"),
            raw_ratings: None,
            raw_trust: None,
            spd_table: None,
            rating_matrix: None,
            seed: 42,
            test_ratio: 0.1,
            walk_length: 50,
            item_seq_len: 50,
            return_param: 1,
            num_anchors: None,
            train_repeat: 10,
            splits: vec![Split::Train, Split::Test],
            force_walks: false,
        }
    }
}

impl Config {
    /// Return bias β in [0, 1]
    pub fn return_bias(&self) -> f64 {
        f64::from(self.return_param) / f64::from(MAX_RETURN_PARAM)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.walk_length == 0 {
            return Err(PrepError::InvalidConfig("walk_length must be at least 1".into()));
        }
        if self.item_seq_len == 0 {
            return Err(PrepError::InvalidConfig("item_seq_len must be at least 1".into()));
        }
        if self.return_param > MAX_RETURN_PARAM {
            return Err(PrepError::InvalidConfig(format!(
                "return_param must be in 0..={}, got {}",
                MAX_RETURN_PARAM, self.return_param
            )));
        }
        if !(0.0..=0.5).contains(&self.test_ratio) {
            return Err(PrepError::InvalidConfig(format!(
                "test_ratio must be in [0, 0.5], got {}",
                self.test_ratio
            )));
        }
        if self.test_ratio == 0.0 {
            if let Some(split) = self.splits.iter().find(|s| **s != Split::Train) {
                return Err(PrepError::InvalidConfig(format!(
                    "test_ratio 0 leaves the {} split empty",
                    split
                )));
            }
        }
        if self.train_repeat == 0 {
            return Err(PrepError::InvalidConfig("train_repeat must be at least 1".into()));
        }
        if self.raw_ratings.is_some() != self.raw_trust.is_some() {
            return Err(PrepError::InvalidConfig(
                "raw ratings and raw trust tables must be given together".into(),
            ));
        }
        Ok(())
    }
}
