//! Seeded train/valid/test partitioning of the rating table

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::Split;
use crate::data::RatingRow;

/// The three partitions of a shuffled rating table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetSplit {
    pub train: Vec<RatingRow>,
    pub valid: Vec<RatingRow>,
    pub test: Vec<RatingRow>,
}

impl DatasetSplit {
    pub fn get(&self, split: Split) -> &[RatingRow] {
        match split {
            Split::Train => &self.train,
            Split::Valid => &self.valid,
            Split::Test => &self.test,
        }
    }
}

/// Shuffle with a seeded generator, then cut `floor(len * test_ratio)` rows
/// for test, the same count for valid, and keep the rest for train.
pub fn shuffle_and_split(rows: &[RatingRow], test_ratio: f64, seed: u64) -> DatasetSplit {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shuffled = rows.to_vec();
    shuffled.shuffle(&mut rng);

    let num_test = (shuffled.len() as f64 * test_ratio).floor() as usize;
    let train = shuffled.split_off(2 * num_test);
    let valid = shuffled.split_off(num_test);
    let test = shuffled;

    log::info!(
        "Split {} ratings into train={} valid={} test={} (seed {})",
        rows.len(),
        train.len(),
        valid.len(),
        test.len(),
        seed
    );

    DatasetSplit { train, valid, test }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: u32) -> Vec<RatingRow> {
        (1..=n).map(|i| RatingRow { user_id: i, item_id: i, rating: 1 }).collect()
    }

    #[test]
    fn test_partition_sizes() {
        let split = shuffle_and_split(&rows(25), 0.1, 42);

        assert_eq!(split.test.len(), 2);
        assert_eq!(split.valid.len(), 2);
        assert_eq!(split.train.len(), 21);
    }

    #[test]
    fn test_partitions_cover_every_row_once() {
        let input = rows(40);
        let split = shuffle_and_split(&input, 0.2, 7);

        let mut all: Vec<u32> = [&split.train, &split.valid, &split.test]
            .iter()
            .flat_map(|part| part.iter().map(|r| r.user_id))
            .collect();
        all.sort_unstable();

        assert_eq!(all, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let input = rows(50);
        assert_eq!(shuffle_and_split(&input, 0.1, 3), shuffle_and_split(&input, 0.1, 3));
        assert_ne!(shuffle_and_split(&input, 0.1, 3), shuffle_and_split(&input, 0.1, 4));
    }
}
