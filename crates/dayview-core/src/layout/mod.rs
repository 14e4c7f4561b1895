//! Interval-packing layout for one day column.
//!
//! This module provides:
//! - Resolution of occurrences into padded display intervals
//! - Partitioning into blobs of overlapping time and column allocation
//! - Layer stacking for assignments spanning several columns
//! - Gap/occurrence chunk sequences clipped to the visible day

mod blob;
mod chunk;
mod clip;
mod context;
mod layer;
mod tree;

pub use blob::{partition_blobs, Blob, ColumnAssignment, Placement};
pub use chunk::ChunkSequencer;
pub use clip::{
    clip_occurrence, compare_intervals, occurrence_minutes, sort_intervals, OccurrenceInterval,
    OccurrenceMinutes,
};
pub use context::ColumnContext;
pub use layer::build_layers;
pub use tree::{Chunk, Column, GripBars, Layer, LayoutTree, OccurrenceChunk};

use std::sync::Arc;

use crate::error::LayoutError;
use crate::occurrence::Occurrence;

/// Clip, sort and partition `occurrences` into blobs.
///
/// Occurrences without any usable date are skipped.
pub fn compute_blobs<'a, I>(occurrences: I, ctx: &ColumnContext) -> Result<Vec<Blob>, LayoutError>
where
    I: IntoIterator<Item = &'a Arc<Occurrence>>,
{
    let mut intervals: Vec<OccurrenceInterval> = occurrences
        .into_iter()
        .filter_map(|occurrence| {
            let interval = clip_occurrence(occurrence, ctx);
            if interval.is_none() {
                tracing::warn!(id = %occurrence.id, "skipping occurrence without a displayable interval");
            }
            interval
        })
        .collect();
    sort_intervals(&mut intervals);
    partition_blobs(intervals)
}

/// Build the complete layout tree for `occurrences` in one column.
///
/// This is a pure function of its inputs; calling it twice with the same
/// occurrences and context yields equal trees.
pub fn compute_layout<'a, I>(occurrences: I, ctx: &ColumnContext) -> Result<LayoutTree, LayoutError>
where
    I: IntoIterator<Item = &'a Arc<Occurrence>>,
{
    let blobs = compute_blobs(occurrences, ctx)?;
    let layers = build_layers(&blobs, &ChunkSequencer::new(ctx));
    tracing::debug!(
        blobs = blobs.len(),
        layers = layers.len(),
        date = %ctx.date,
        "computed column layout"
    );
    Ok(LayoutTree { layers })
}
