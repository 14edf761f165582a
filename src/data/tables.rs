//! CSV / Parquet table handling for rating and trust data

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Result};
use polars::prelude::*;

use crate::data::RatingRow;
use crate::graph::DegreeIndex;

/// Read a table, picking the reader from the file extension
pub fn read_table(path: &Path) -> Result<DataFrame> {
    log::info!("Reading table: {}", path.display());

    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let is_parquet = path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"));

    let df = if is_parquet {
        LazyFrame::scan_parquet(path, Default::default())?.collect()?
    } else {
        CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?
    };

    log::debug!("Table schema: {:?}", df.schema());
    log::info!("Loaded {} rows", df.height());

    Ok(df)
}

/// Extract an integer column as non-negative `u32` ids
fn id_column(df: &DataFrame, name: &str) -> Result<Vec<u32>> {
    let casted = df.column(name)?.cast(&DataType::Int64)?;
    let values = casted.i64()?;

    values.into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.ok_or_else(|| anyhow!("null {} in row {}", name, row))?;
            u32::try_from(value).map_err(|_| anyhow!("invalid {} {} in row {}", name, value, row))
        })
        .collect()
}

/// Load `(user_id, product_id, rating)` rows; extra columns are ignored
pub fn load_ratings(path: &Path) -> Result<Vec<RatingRow>> {
    let df = read_table(path)?;

    let users = id_column(&df, "user_id")?;
    let items = id_column(&df, "product_id")?;
    let ratings = id_column(&df, "rating")?;

    users.into_iter()
        .zip(items)
        .zip(ratings)
        .map(|((user_id, item_id), rating)| {
            let rating = u16::try_from(rating)
                .map_err(|_| anyhow!("rating {} out of range for user {}", rating, user_id))?;
            Ok(RatingRow { user_id, item_id, rating })
        })
        .collect()
}

/// Load `(user_id_1, user_id_2)` trust rows
pub fn load_trust(path: &Path) -> Result<Vec<(u32, u32)>> {
    let df = read_table(path)?;

    let sources = id_column(&df, "user_id_1")?;
    let targets = id_column(&df, "user_id_2")?;

    Ok(sources.into_iter().zip(targets).collect())
}

fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)?;

    log::info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

pub fn write_ratings(path: &Path, rows: &[RatingRow]) -> Result<()> {
    let mut df = df!(
        "user_id" => rows.iter().map(|r| i64::from(r.user_id)).collect::<Vec<_>>(),
        "product_id" => rows.iter().map(|r| i64::from(r.item_id)).collect::<Vec<_>>(),
        "rating" => rows.iter().map(|r| i64::from(r.rating)).collect::<Vec<_>>()
    )?;
    write_csv(path, &mut df)
}

pub fn write_trust(path: &Path, edges: &[(u32, u32)]) -> Result<()> {
    let mut df = df!(
        "user_id_1" => edges.iter().map(|&(a, _)| i64::from(a)).collect::<Vec<_>>(),
        "user_id_2" => edges.iter().map(|&(_, b)| i64::from(b)).collect::<Vec<_>>()
    )?;
    write_csv(path, &mut df)
}

/// Persist a degree table as `(<id_name>, degree)` sorted by id
pub fn write_degree_table(path: &Path, index: &DegreeIndex, id_name: &str) -> Result<()> {
    let (ids, degrees): (Vec<i64>, Vec<i64>) = index.entries()
        .map(|(id, degree)| (i64::from(id), i64::from(degree)))
        .unzip();

    let mut df = df!(
        id_name => ids,
        "degree" => degrees
    )?;
    write_csv(path, &mut df)
}
