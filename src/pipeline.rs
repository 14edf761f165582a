//! Stage orchestration for one preparation run

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::assemble::SequenceAssembler;
use crate::config::{Config, Split};
use crate::data::preprocessing::{active_users, filter_edges_to_users, remap_ids};
use crate::data::split::shuffle_and_split;
use crate::data::{tables, DatasetSplit, InteractionIndex, RatingMatrix, RatingRow};
use crate::graph::{DegreeIndex, GraphBuilder, SpdTable};
use crate::storage::{self, ArtifactPaths};
use crate::walk::{self, BiasedWalkSampler, Walk, WalkConfig};

/// Counts produced for one split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    pub split: Split,
    pub node_count: usize,
    pub walk_count: usize,
    pub record_count: usize,
}

/// Run every stage: optional remap, split, shared tables, then each split
pub fn run(config: &Config) -> Result<Vec<SplitOutcome>> {
    config.validate()?;
    std::fs::create_dir_all(&config.data_dir)?;
    let paths = ArtifactPaths::new(&config.data_dir);

    // 1. Remap raw tables if given
    if let (Some(raw_ratings), Some(raw_trust)) = (&config.raw_ratings, &config.raw_trust) {
        prepare(&paths, raw_ratings, raw_trust)?;
    }

    // 2. Train/valid/test split
    let dataset = ensure_split(&paths, config)?;

    // 3. Tables shared by every split
    let trust = tables::load_trust(&paths.trust())?;
    let ratings = match &config.rating_matrix {
        Some(path) => storage::load_rating_npy(path)?,
        None => load_or_build_rating_matrix(&paths)?,
    };
    let spd = match &config.spd_table {
        Some(path) => storage::load_spd_npy(path)?,
        None => load_or_compute_spd(&paths, &trust)?,
    };

    // 4. Per-split graph, walks and records
    let mut outcomes = Vec::with_capacity(config.splits.len());
    for &split in &config.splits {
        let outcome = run_split(config, &paths, split, dataset.get(split), &trust, &ratings, &spd)?;
        outcomes.push(outcome);
    }

    log::info!("Preparation complete. Results saved to {}", paths.dir().display());

    Ok(outcomes)
}

/// Remap raw rating/trust tables to dense ids and rebuild the rating matrix.
///
/// Every artifact derived from previously remapped tables is removed first.
pub fn prepare(paths: &ArtifactPaths, raw_ratings: &Path, raw_trust: &Path) -> Result<()> {
    log::info!("Remapping raw tables");

    let removed = paths.clear_derived()?;
    if removed > 0 {
        log::info!("Removed {} stale artifacts from {}", removed, paths.dir().display());
    }

    let ratings = tables::load_ratings(raw_ratings)?;
    let trust = tables::load_trust(raw_trust)?;
    let remapped = remap_ids(&ratings, &trust);

    log::info!(
        "Remapped to {} users and {} items",
        remapped.user_count,
        remapped.item_count
    );

    tables::write_ratings(&paths.ratings(), &remapped.ratings)?;
    tables::write_trust(&paths.trust(), &remapped.trust)?;
    storage::save_bincode(&paths.rating_matrix(), &RatingMatrix::from_rows(&remapped.ratings))?;

    Ok(())
}

/// Load the split for `config.seed`, creating it first if any part is missing
pub fn ensure_split(paths: &ArtifactPaths, config: &Config) -> Result<DatasetSplit> {
    let all = [Split::Train, Split::Valid, Split::Test];

    if all.iter().all(|&s| paths.split_ratings(s, config.seed).exists()) {
        log::info!("Split data exists, seed: {}", config.seed);
        let dataset = DatasetSplit {
            train: tables::load_ratings(&paths.split_ratings(Split::Train, config.seed))?,
            valid: tables::load_ratings(&paths.split_ratings(Split::Valid, config.seed))?,
            test: tables::load_ratings(&paths.split_ratings(Split::Test, config.seed))?,
        };
        check_requested_splits(&dataset, &config.splits)?;
        return Ok(dataset);
    }

    let rows = tables::load_ratings(&paths.ratings())?;
    let dataset = shuffle_and_split(&rows, config.test_ratio, config.seed);
    check_requested_splits(&dataset, &config.splits)?;

    for split in all {
        tables::write_ratings(&paths.split_ratings(split, config.seed), dataset.get(split))?;
    }

    Ok(dataset)
}

fn check_requested_splits(dataset: &DatasetSplit, splits: &[Split]) -> Result<()> {
    match splits.iter().find(|&&split| dataset.get(split).is_empty()) {
        Some(split) => Err(anyhow!("{} split has no ratings", split)),
        None => Ok(()),
    }
}

fn load_or_build_rating_matrix(paths: &ArtifactPaths) -> Result<RatingMatrix> {
    let path = paths.rating_matrix();
    if path.exists() {
        return storage::load_bincode(&path);
    }

    let matrix = RatingMatrix::from_rows(&tables::load_ratings(&paths.ratings())?);
    storage::save_bincode(&path, &matrix)?;
    Ok(matrix)
}

fn load_or_compute_spd(paths: &ArtifactPaths, trust: &[(u32, u32)]) -> Result<SpdTable> {
    let path = paths.spd();
    if path.exists() {
        return storage::load_bincode(&path);
    }

    let graph = GraphBuilder::from_edges(trust.iter().copied())?;
    let spd = SpdTable::compute(&graph);
    storage::save_bincode(&path, &spd)?;
    Ok(spd)
}

/// Build the split's graph and lookup tables, then generate walks and records
pub fn run_split(
    config: &Config,
    paths: &ArtifactPaths,
    split: Split,
    rows: &[RatingRow],
    trust: &[(u32, u32)],
    ratings: &RatingMatrix,
    spd: &SpdTable,
) -> Result<SplitOutcome> {
    log::info!("Processing {} split ({} ratings)", split, rows.len());

    if rows.is_empty() {
        return Err(anyhow!("{} split has no ratings", split));
    }

    // Social graph restricted to users active in this split
    let users = active_users(rows);
    let edges = filter_edges_to_users(trust, &users);
    tables::write_trust(&paths.split_trust(split, config.seed), &edges)?;

    let graph = GraphBuilder::from_edges(edges.iter().copied())?;
    log::info!(
        "Loaded {} graph with {} nodes and {} edges",
        split,
        graph.node_count(),
        graph.edge_count()
    );

    // Degree tables
    let social_degrees = DegreeIndex::from_graph(&graph);
    tables::write_degree_table(&paths.social_degrees(split, config.seed), &social_degrees, "user_id")?;

    let item_degrees = DegreeIndex::item_popularity(rows.iter().map(|r| (r.user_id, r.item_id)));
    tables::write_degree_table(&paths.item_degrees(split, config.seed), &item_degrees, "product_id")?;

    let interactions = InteractionIndex::build(rows, &item_degrees)?;

    // Walks
    let node_count = graph.node_count();
    let num_nodes = config.num_anchors.map_or(node_count, |n| n.min(node_count));
    let walk_path = paths.walks(num_nodes, config, split);

    let walks: Vec<Walk> = if walk_path.exists() && !config.force_walks {
        log::info!("Generated walks already exist: {}", walk_path.display());
        storage::load_bincode(&walk_path)?
    } else {
        let anchors = walk::select_anchors(&graph, config.num_anchors, split.repeat_count(config), config.seed);
        let sampler = BiasedWalkSampler::new(
            &graph,
            &social_degrees,
            WalkConfig::new(config.walk_length, config.return_bias())?,
        );

        let mut walks = sampler.sample_walks(&anchors, config.seed)?;
        walk::sort_by_anchor(&mut walks);
        storage::save_bincode(&walk_path, &walks)?;
        walks
    };

    // Records
    let assembler = SequenceAssembler::new(&interactions, spd, ratings, config.item_seq_len)?;
    let records = assembler.assemble_all(&walks)?;
    storage::save_bincode(&paths.records(config, split), &records)?;

    let summary = storage::build_summary(config, split, &graph, &walks, &records);
    storage::save_summary(&paths.summary(config, split), &summary)?;

    Ok(SplitOutcome {
        split,
        node_count,
        walk_count: walks.len(),
        record_count: records.len(),
    })
}
