//! Joins walks with item interactions, ratings and shortest paths

use itertools::Itertools;
use rayon::prelude::*;

use crate::assemble::FinalRecord;
use crate::data::{InteractionIndex, RatingMatrix};
use crate::error::PrepError;
use crate::graph::SpdTable;
use crate::walk::Walk;

/// An item reached through a walk member, with the member that rated it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PooledItem {
    pub item_id: u32,
    pub rating: u16,
    pub item_degree: u32,
    pub owner: u32,
}

/// Concatenate the item lists of every non-sentinel walk member in walk order
/// and drop repeated items. The first occurrence of an item wins.
pub fn pool_items(nodes: &[u32], interactions: &InteractionIndex) -> Result<Vec<PooledItem>, PrepError> {
    let mut pooled = Vec::new();

    for &node in nodes.iter().filter(|&&node| node != 0) {
        let items = interactions.items_of(node)?;
        pooled.extend(items.iter().map(|interaction| PooledItem {
            item_id: interaction.item_id,
            rating: interaction.rating,
            item_degree: interaction.item_degree,
            owner: node,
        }));
    }

    Ok(pooled.into_iter().unique_by(|item| item.item_id).collect())
}

/// Split into consecutive blocks of exactly `len`, zero-padding the last one.
/// An empty input yields no blocks.
pub fn chunk_padded(values: &[u32], len: usize) -> Vec<Vec<u32>> {
    values.chunks(len)
        .map(|chunk| {
            let mut block = chunk.to_vec();
            block.resize(len, 0);
            block
        })
        .collect()
}

/// Builds `FinalRecord`s from walks against shared, read-only lookup tables
pub struct SequenceAssembler<'a> {
    interactions: &'a InteractionIndex,
    spd: &'a SpdTable,
    ratings: &'a RatingMatrix,
    item_seq_len: usize,
}

impl<'a> SequenceAssembler<'a> {
    pub fn new(
        interactions: &'a InteractionIndex,
        spd: &'a SpdTable,
        ratings: &'a RatingMatrix,
        item_seq_len: usize,
    ) -> Result<Self, PrepError> {
        if item_seq_len == 0 {
            return Err(PrepError::InvalidConfig("item_seq_len must be at least 1".into()));
        }
        Ok(Self { interactions, spd, ratings, item_seq_len })
    }

    /// One record per `item_seq_len` chunk of the walk's deduplicated items
    pub fn assemble(&self, walk: &Walk) -> Result<Vec<FinalRecord>, PrepError> {
        let pooled = pool_items(&walk.nodes, self.interactions)?;

        let item_ids: Vec<u32> = pooled.iter().map(|item| item.item_id).collect();
        let item_degrees: Vec<u32> = pooled.iter().map(|item| item.item_degree).collect();

        let spd = self.spd.gather(&walk.nodes)?;

        let item_chunks = chunk_padded(&item_ids, self.item_seq_len);
        let degree_chunks = chunk_padded(&item_degrees, self.item_seq_len);

        if item_chunks.is_empty() {
            log::debug!("Walk from anchor {} reached no items", walk.anchor);
        }

        item_chunks.into_iter()
            .zip(degree_chunks)
            .map(|(items, item_degrees)| {
                let ratings = self.ratings.gather(&walk.nodes, &items)?;
                Ok(FinalRecord {
                    anchor: walk.anchor,
                    walk: walk.nodes.clone(),
                    walk_degrees: walk.degrees.clone(),
                    items,
                    item_degrees,
                    ratings,
                    spd: spd.clone(),
                })
            })
            .collect()
    }

    /// Assemble every walk in parallel, preserving walk order. The first
    /// error aborts the whole batch.
    pub fn assemble_all(&self, walks: &[Walk]) -> Result<Vec<FinalRecord>, PrepError> {
        log::info!("Assembling records for {} walks", walks.len());

        let per_walk: Vec<Vec<FinalRecord>> = walks.par_iter()
            .map(|walk| self.assemble(walk))
            .collect::<Result<_, _>>()?;

        let records: Vec<FinalRecord> = per_walk.into_iter().flatten().collect();
        log::info!("Assembled {} records", records.len());

        Ok(records)
    }
}
