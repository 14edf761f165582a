//! Dense user x item rating matrix

use std::mem;

use ndarray::Array2;
use serde::{Serialize, Deserialize};

use crate::data::RatingRow;
use crate::error::PrepError;

/// Dense `[user_id][item_id]` rating lookup. Row 0 and column 0 are reserved
/// for the sentinel and always read 0.
///
/// Memory is `(max_user + 1) * (max_item + 1) * 2` bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingMatrix {
    values: Array2<u16>,
}

impl RatingMatrix {
    /// Build from the full (unsplit) rating table. Later rows overwrite earlier
    /// ones for the same (user, item) pair.
    pub fn from_rows(rows: &[RatingRow]) -> Self {
        let max_user = rows.iter().map(|r| r.user_id).max().unwrap_or(0) as usize;
        let max_item = rows.iter().map(|r| r.item_id).max().unwrap_or(0) as usize;

        let mut values = Array2::zeros((max_user + 1, max_item + 1));
        for row in rows {
            if row.user_id != 0 && row.item_id != 0 {
                values[[row.user_id as usize, row.item_id as usize]] = row.rating;
            }
        }

        let matrix = Self { values };
        log::info!(
            "Built rating matrix {}x{} ({} bytes)",
            max_user + 1,
            max_item + 1,
            matrix.memory_usage()
        );

        matrix
    }

    /// Wrap an externally supplied matrix
    pub fn from_array(values: Array2<u16>) -> Self {
        let matrix = Self { values };
        log::info!("Loaded rating matrix {:?} ({} bytes)", matrix.dim(), matrix.memory_usage());
        matrix
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn memory_usage(&self) -> usize {
        self.values.len() * mem::size_of::<u16>()
    }

    /// Rating of `item` by `user`; sentinel ids read 0
    pub fn value(&self, user: u32, item: u32) -> Result<u16, PrepError> {
        self.check(user, item)?;
        if user == 0 || item == 0 {
            return Ok(0);
        }
        Ok(self.values[[user as usize, item as usize]])
    }

    /// `[users x items]` sub-matrix gathered in the given orders
    pub fn gather(&self, users: &[u32], items: &[u32]) -> Result<Array2<u16>, PrepError> {
        for &user in users {
            self.check(user, 0)?;
        }
        for &item in items {
            self.check(0, item)?;
        }

        Ok(Array2::from_shape_fn((users.len(), items.len()), |(i, j)| {
            let (user, item) = (users[i], items[j]);
            if user == 0 || item == 0 {
                0
            } else {
                self.values[[user as usize, item as usize]]
            }
        }))
    }

    fn check(&self, user: u32, item: u32) -> Result<(), PrepError> {
        let (rows, cols) = self.dim();
        if user != 0 && user as usize >= rows {
            return Err(PrepError::IndexOutOfRange { table: "rating matrix rows", index: user as usize, len: rows });
        }
        if item != 0 && item as usize >= cols {
            return Err(PrepError::IndexOutOfRange { table: "rating matrix columns", index: item as usize, len: cols });
        }
        Ok(())
    }
}
