//! Stacking blob assignments into rendering layers.
//!
//! Every blob gets its own run of layers. Single-column assignments share the
//! blob's first layer; each distinct `(col_span, start_col)` of a wider
//! assignment gets a layer of its own, so two wide assignments never land in
//! the same slot.

use std::collections::HashMap;

use super::blob::Blob;
use super::chunk::ChunkSequencer;
use super::tree::{Column, Layer};

/// Build the layers for `blobs`, filling each column through `sequencer`.
pub fn build_layers(blobs: &[Blob], sequencer: &ChunkSequencer) -> Vec<Layer> {
    let mut layers = Vec::new();
    for blob in blobs {
        layers.extend(blob_layers(blob, sequencer));
    }
    layers
}

fn blob_layers(blob: &Blob, sequencer: &ChunkSequencer) -> Vec<Layer> {
    let total_cols = blob.total_cols;
    let mut layers: Vec<Layer> = Vec::new();
    let mut keyed: HashMap<usize, usize> = HashMap::new();
    let mut next_layer = 1;

    for assignment in &blob.assignments {
        let (layer_index, special_span) = if assignment.col_span == 1 {
            (0, None)
        } else {
            let key = total_cols * assignment.col_span + assignment.start_col;
            let index = *keyed.entry(key).or_insert_with(|| {
                next_layer += 1;
                next_layer - 1
            });
            let special = (assignment.col_span != total_cols)
                .then(|| assignment.col_span as f64 / total_cols as f64);
            (index, special)
        };

        while layers.len() <= layer_index {
            layers.push(Layer::new(total_cols));
        }
        let layer = &mut layers[layer_index];

        // Padding in front of a fractional column is one blob column wide.
        let padding_span = special_span.map(|_| 1.0 / total_cols as f64);
        while layer.columns.len() <= assignment.start_col {
            layer.columns.push(Column::empty(padding_span));
        }

        let column = &mut layer.columns[assignment.start_col];
        column.span = assignment.col_span as f64;
        if special_span.is_some() {
            column.special_span = special_span;
        }
        sequencer.append(column, &assignment.interval);
    }

    // A blob whose narrow assignments were all widened leaves layer 0 empty.
    layers.retain(|layer| !layer.columns.is_empty());
    for layer in &mut layers {
        layer.pad_to_total();
    }
    layers
}
