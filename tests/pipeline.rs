use std::path::Path;

use social_seq_prep::assemble::FinalRecord;
use social_seq_prep::config::{Config, Split};
use social_seq_prep::data::{tables, RatingRow};
use social_seq_prep::graph::SpdTable;
use social_seq_prep::pipeline;
use social_seq_prep::storage::{self, ArtifactPaths};
use social_seq_prep::walk::Walk;

const USERS: u32 = 6;
const ITEMS_PER_USER: u32 = 10;

/// Six mutually trusting users, each rating ten items; neighbors share half
/// of their items.
fn write_dataset(dir: &Path) {
    let paths = ArtifactPaths::new(dir);

    let ratings: Vec<RatingRow> = (1..=USERS)
        .flat_map(|user| {
            (0..ITEMS_PER_USER).map(move |k| RatingRow {
                user_id: user,
                item_id: (user - 1) * ITEMS_PER_USER / 2 + k + 1,
                rating: (k % 5 + 1) as u16,
            })
        })
        .collect();

    let trust: Vec<(u32, u32)> = (1..=USERS)
        .flat_map(|a| (a + 1..=USERS).map(move |b| (a, b)))
        .collect();

    tables::write_ratings(&paths.ratings(), &ratings).unwrap();
    tables::write_trust(&paths.trust(), &trust).unwrap();
}

fn config(dir: &Path) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        seed: 3,
        test_ratio: 0.1,
        walk_length: 4,
        item_seq_len: 8,
        return_param: 2,
        train_repeat: 2,
        ..Config::default()
    }
}

#[test]
fn test_end_to_end_run_writes_records() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let config = config(dir.path());
    let paths = ArtifactPaths::new(dir.path());

    let outcomes = pipeline::run(&config).unwrap();
    assert_eq!(outcomes.len(), 2);

    // 12 held-out rows can remove at most one user from train
    let train = outcomes[0];
    assert_eq!(train.split, Split::Train);
    assert!(train.node_count >= 5);
    assert_eq!(train.walk_count, train.node_count * 2);
    assert!(train.record_count >= train.walk_count);

    let test = outcomes[1];
    assert_eq!(test.split, Split::Test);
    assert_eq!(test.walk_count, test.node_count);

    for split in [Split::Train, Split::Valid, Split::Test] {
        assert!(paths.split_ratings(split, config.seed).exists());
    }
    assert!(paths.rating_matrix().exists());
    assert!(paths.spd().exists());
    assert!(paths.summary(&config, Split::Train).exists());

    let walks: Vec<Walk> = storage::load_bincode(&paths.walks(train.node_count, &config, Split::Train)).unwrap();
    assert_eq!(walks.len(), train.walk_count);
    assert!(walks.windows(2).all(|w| w[0].anchor <= w[1].anchor));

    let records: Vec<FinalRecord> = storage::load_bincode(&paths.records(&config, Split::Train)).unwrap();
    assert_eq!(records.len(), train.record_count);
    for record in &records {
        assert_eq!(record.walk.len(), 4);
        assert_eq!(record.walk_degrees.len(), 4);
        assert_eq!(record.items.len(), 8);
        assert_eq!(record.item_degrees.len(), 8);
        assert_eq!(record.ratings.dim(), (4, 8));
        assert_eq!(record.spd.dim(), (4, 4));
        assert_eq!(record.walk[0], record.anchor);
        // K6: every pair of distinct users is one hop apart
        for i in 0..4 {
            for j in 0..4 {
                let (a, b) = (record.walk[i], record.walk[j]);
                let expected = if a == 0 || b == 0 || a == b { 0 } else { 1 };
                assert_eq!(record.spd[[i, j]], expected);
            }
        }
    }
}

#[test]
fn test_rerun_reuses_split_and_walks() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let config = config(dir.path());
    let paths = ArtifactPaths::new(dir.path());

    let first = pipeline::run(&config).unwrap();
    let walk_path = paths.walks(first[0].node_count, &config, Split::Train);
    let walks_before: Vec<Walk> = storage::load_bincode(&walk_path).unwrap();
    let split_before = tables::load_ratings(&paths.split_ratings(Split::Test, config.seed)).unwrap();

    let second = pipeline::run(&config).unwrap();
    let walks_after: Vec<Walk> = storage::load_bincode(&walk_path).unwrap();
    let split_after = tables::load_ratings(&paths.split_ratings(Split::Test, config.seed)).unwrap();

    assert_eq!(first, second);
    assert_eq!(walks_before, walks_after);
    assert_eq!(split_before, split_after);
}

#[test]
fn test_raw_tables_are_remapped_first() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let raw_ratings = raw.path().join("ratings.csv");
    let raw_trust = raw.path().join("trust.csv");

    // Sparse raw ids; user 900 has no trust edges and is dropped
    let ratings: Vec<RatingRow> = [100u32, 200, 300, 900]
        .iter()
        .flat_map(|&user| {
            (0..ITEMS_PER_USER).map(move |k| RatingRow { user_id: user, item_id: 5000 + k * 7, rating: 4 })
        })
        .collect();
    tables::write_ratings(&raw_ratings, &ratings).unwrap();
    tables::write_trust(&raw_trust, &[(100, 200), (200, 300), (300, 100)]).unwrap();

    let config = Config {
        raw_ratings: Some(raw_ratings),
        raw_trust: Some(raw_trust),
        ..config(out.path())
    };
    pipeline::run(&config).unwrap();

    let paths = ArtifactPaths::new(out.path());
    let remapped = tables::load_ratings(&paths.ratings()).unwrap();
    assert_eq!(remapped.len(), 3 * ITEMS_PER_USER as usize);
    assert!(remapped.iter().all(|r| (1..=3).contains(&r.user_id)));
    assert!(remapped.iter().all(|r| (1..=ITEMS_PER_USER).contains(&r.item_id)));

    let trust = tables::load_trust(&paths.trust()).unwrap();
    assert_eq!(trust, vec![(1, 2), (2, 3), (3, 1)]);
}

#[test]
fn test_invalid_config_is_rejected_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config { return_param: 11, ..config(dir.path()) };

    assert!(pipeline::run(&config).is_err());
    assert!(!ArtifactPaths::new(dir.path()).rating_matrix().exists());
}

#[test]
fn test_changing_repeat_count_regenerates_walks() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let few = pipeline::run(&config(dir.path())).unwrap();
    let many = pipeline::run(&Config { train_repeat: 5, ..config(dir.path()) }).unwrap();

    assert_eq!(few[0].walk_count, few[0].node_count * 2);
    assert_eq!(many[0].node_count, few[0].node_count);
    assert_eq!(many[0].walk_count, many[0].node_count * 5);
}

/// Raw tables for a trust ring of `users` sparse ids, each rating ten items
fn write_raw_ring(dir: &Path, users: u32) -> (std::path::PathBuf, std::path::PathBuf) {
    let raw_ratings = dir.join(format!("ratings_{}.csv", users));
    let raw_trust = dir.join(format!("trust_{}.csv", users));

    let ratings: Vec<RatingRow> = (1..=users)
        .flat_map(|u| (0..ITEMS_PER_USER).map(move |k| RatingRow { user_id: u * 100, item_id: 9000 + u + k, rating: 3 }))
        .collect();
    let trust: Vec<(u32, u32)> = (1..=users).map(|u| (u * 100, (u % users + 1) * 100)).collect();

    tables::write_ratings(&raw_ratings, &ratings).unwrap();
    tables::write_trust(&raw_trust, &trust).unwrap();
    (raw_ratings, raw_trust)
}

#[test]
fn test_remapping_new_raw_tables_drops_stale_caches() {
    let raw = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(out.path());

    let (small_ratings, small_trust) = write_raw_ring(raw.path(), 4);
    let small = Config {
        raw_ratings: Some(small_ratings),
        raw_trust: Some(small_trust),
        ..config(out.path())
    };
    pipeline::run(&small).unwrap();
    let spd: SpdTable = storage::load_bincode(&paths.spd()).unwrap();
    assert_eq!(spd.num_users(), 4);

    let (large_ratings, large_trust) = write_raw_ring(raw.path(), 8);
    let large = Config {
        raw_ratings: Some(large_ratings),
        raw_trust: Some(large_trust),
        ..config(out.path())
    };
    pipeline::run(&large).unwrap();

    let spd: SpdTable = storage::load_bincode(&paths.spd()).unwrap();
    assert_eq!(spd.num_users(), 8);
    assert_eq!(spd.distance(1, 5), Ok(4));

    let train = tables::load_ratings(&paths.split_ratings(Split::Train, large.seed)).unwrap();
    assert!(train.iter().any(|row| row.user_id > 4));
}

#[test]
fn test_external_npy_tables_are_used() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let n = USERS as usize;
    let spd = ndarray::Array2::from_shape_fn((n, n), |(i, j)| if i == j { 0i64 } else { 7 });
    let max_item = (USERS - 1) * ITEMS_PER_USER / 2 + ITEMS_PER_USER;
    let ratings = ndarray::Array2::from_shape_fn((n + 1, max_item as usize + 1), |(u, i)| {
        if u == 0 || i == 0 { 0u16 } else { 9 }
    });

    let spd_path = dir.path().join("shortest_path_result.npy");
    let rating_path = dir.path().join("rating_matrix.npy");
    ndarray_npy::write_npy(&spd_path, &spd).unwrap();
    ndarray_npy::write_npy(&rating_path, &ratings).unwrap();

    let config = Config {
        spd_table: Some(spd_path),
        rating_matrix: Some(rating_path),
        splits: vec![Split::Train],
        ..config(dir.path())
    };
    let paths = ArtifactPaths::new(dir.path());
    pipeline::run(&config).unwrap();

    assert!(!paths.spd().exists());
    assert!(!paths.rating_matrix().exists());

    let records: Vec<FinalRecord> = storage::load_bincode(&paths.records(&config, Split::Train)).unwrap();
    assert!(!records.is_empty());
    for record in &records {
        for (i, &user) in record.walk.iter().enumerate() {
            for (j, &other) in record.walk.iter().enumerate() {
                let expected = if user == 0 || other == 0 || user == other { 0 } else { 7 };
                assert_eq!(record.spd[[i, j]], expected);
            }
            for (j, &item) in record.items.iter().enumerate() {
                let expected = if user == 0 || item == 0 { 0 } else { 9 };
                assert_eq!(record.ratings[[i, j]], expected);
            }
        }
    }
}

#[test]
fn test_empty_requested_split_fails_before_writing_splits() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let paths = ArtifactPaths::new(dir.path());

    let zero = Config { test_ratio: 0.0, ..config(dir.path()) };
    assert!(pipeline::run(&zero).is_err());

    // 60 rows at 1% rounds down to an empty test split
    let tiny = Config { test_ratio: 0.01, ..config(dir.path()) };
    let err = pipeline::run(&tiny).unwrap_err();
    assert!(err.to_string().contains("test split has no ratings"));

    assert!(!paths.split_ratings(Split::Train, tiny.seed).exists());
    assert!(!paths.split_ratings(Split::Test, tiny.seed).exists());
}
