//! Artifact naming and persistence

use anyhow::{anyhow, Result};
use ndarray::Array2;
use ndarray_npy::{read_npy, ReadNpyError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, to_string_pretty, Value};
use statrs::statistics::Statistics;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::assemble::FinalRecord;
use crate::config::{Config, Split};
use crate::data::RatingMatrix;
use crate::graph::spd::UNREACHABLE;
use crate::graph::{SocialGraph, SpdTable};
use crate::walk::Walk;

/// File names of every table and artifact inside the data directory
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remapped rating table
    pub fn ratings(&self) -> PathBuf {
        self.dir.join("rating.csv")
    }

    /// Remapped trust table
    pub fn trust(&self) -> PathBuf {
        self.dir.join("trustnetwork.csv")
    }

    pub fn rating_matrix(&self) -> PathBuf {
        self.dir.join("rating_matrix.bin")
    }

    pub fn spd(&self) -> PathBuf {
        self.dir.join("shortest_path.bin")
    }

    pub fn split_ratings(&self, split: Split, seed: u64) -> PathBuf {
        self.dir.join(format!("rating_{}_seed_{}.csv", split, seed))
    }

    pub fn split_trust(&self, split: Split, seed: u64) -> PathBuf {
        self.dir.join(format!("trustnetwork_{}_seed_{}.csv", split, seed))
    }

    pub fn social_degrees(&self, split: Split, seed: u64) -> PathBuf {
        self.dir.join(format!("degree_table_social_{}_seed_{}.csv", split, seed))
    }

    pub fn item_degrees(&self, split: Split, seed: u64) -> PathBuf {
        self.dir.join(format!("degree_table_item_{}_seed_{}.csv", split, seed))
    }

    /// Walk table for one (anchor count, repeats per anchor, walk length,
    /// return param, split, seed)
    pub fn walks(&self, num_nodes: usize, config: &Config, split: Split) -> PathBuf {
        self.dir.join(format!(
            "social_user_{}_repeat_{}_rw_length_{}_rp_{}_split_{}_seed_{}.bin",
            num_nodes,
            split.repeat_count(config),
            config.walk_length,
            config.return_param,
            split,
            config.seed
        ))
    }

    /// Final record set for one (seed, walk length, item length, return param, split)
    pub fn records(&self, config: &Config, split: Split) -> PathBuf {
        self.dir.join(format!(
            "sequence_data_seed_{}_walk_{}_itemlen_{}_rp_{}_{}.bin",
            config.seed, config.walk_length, config.item_seq_len, config.return_param, split
        ))
    }

    /// Remove every split, walk, record and shortest-path artifact derived
    /// from the remapped tables. Returns the number of files removed.
    pub fn clear_derived(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && is_derived(&path) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn summary(&self, config: &Config, split: Split) -> PathBuf {
        self.dir.join(format!(
            "summary_seed_{}_walk_{}_itemlen_{}_rp_{}_{}.json",
            config.seed, config.walk_length, config.item_seq_len, config.return_param, split
        ))
    }
}

fn is_derived(path: &Path) -> bool {
    const PREFIXES: [&str; 7] = [
        "rating_",
        "trustnetwork_",
        "degree_table_",
        "social_user_",
        "sequence_data_",
        "summary_",
        "shortest_path",
    ];

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    matches!(ext, "csv" | "bin" | "json") && PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Load an externally supplied `[users x users]` distance matrix from `.npy`.
///
/// `int64` arrays are taken as is; `float64` arrays are truncated, with
/// non-finite entries stored as unreachable.
pub fn load_spd_npy(path: &Path) -> Result<SpdTable> {
    log::info!("Loading shortest path table {}", path.display());

    let dist: Array2<i64> = match read_npy(path) {
        Ok(dist) => dist,
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let dist: Array2<f64> = read_npy(path)?;
            dist.mapv(|d| if d.is_finite() { d as i64 } else { UNREACHABLE })
        }
        Err(e) => return Err(e.into()),
    };

    Ok(SpdTable::from_array(dist)?)
}

/// Load an externally supplied `[user_id][item_id]` rating matrix from `.npy`
/// (`uint16`, or `int64` with values that fit in `u16`).
pub fn load_rating_npy(path: &Path) -> Result<RatingMatrix> {
    log::info!("Loading rating matrix {}", path.display());

    let values: Array2<u16> = match read_npy(path) {
        Ok(values) => values,
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let wide: Array2<i64> = read_npy(path)?;
            if let Some(bad) = wide.iter().find(|&&v| u16::try_from(v).is_err()) {
                return Err(anyhow!("rating {} in {} does not fit in u16", bad, path.display()));
            }
            wide.mapv(|v| v as u16)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(RatingMatrix::from_array(values))
}

/// Save any serializable value as bincode
pub fn save_bincode<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;

    log::info!("Saved {}", path.display());
    Ok(())
}

/// Load a value written by `save_bincode`
pub fn load_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    log::info!("Loading {}", path.display());

    let file = File::open(path)?;
    let value = bincode::deserialize_from(BufReader::new(file))?;
    Ok(value)
}

/// Summary statistics for one processed split
pub fn build_summary(
    config: &Config,
    split: Split,
    graph: &SocialGraph,
    walks: &[Walk],
    records: &[FinalRecord],
) -> Value {
    let effective_lengths: Vec<f64> = walks.iter().map(|w| w.effective_len() as f64).collect();
    let exhausted = walks.iter().filter(|w| w.is_exhausted()).count();
    let padded_items: usize = records.iter()
        .map(|r| r.items.iter().filter(|&&item| item == 0).count())
        .sum();

    json!({
        "split": split.as_str(),
        "seed": config.seed,
        "walk_length": config.walk_length,
        "item_seq_len": config.item_seq_len,
        "return_param": config.return_param,
        "graph_stats": {
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "memory_bytes": graph.memory_usage(),
        },
        "walk_stats": {
            "walk_count": walks.len(),
            "exhausted_count": exhausted,
            "mean_effective_length": effective_lengths.iter().mean(),
            "std_effective_length": effective_lengths.iter().std_dev(),
        },
        "record_stats": {
            "record_count": records.len(),
            "records_per_walk": records.len() as f64 /
                                if walks.is_empty() { 1.0 } else { walks.len() as f64 },
            "padded_item_slots": padded_items,
        }
    })
}

/// Write a summary as pretty JSON
pub fn save_summary(path: &Path, summary: &Value) -> Result<()> {
    log::info!("Saving summary to {}", path.display());

    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(summary)?.as_bytes())?;

    Ok(())
}
