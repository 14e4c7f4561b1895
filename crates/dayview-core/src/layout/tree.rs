//! The layout tree handed to renderers.
//!
//! ```text
//! LayoutTree
//!   └─ Layer      (one per blob and span key; stacked across the time axis)
//!        └─ Column (weighted slot; weights of a layer sum to its total_cols)
//!             └─ Chunk (gap placeholder or occurrence segment)
//! ```

use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::occurrence::{Occurrence, OccurrenceId};

/// Complete layout of one day column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutTree {
    pub layers: Vec<Layer>,
}

impl LayoutTree {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// All occurrence chunks, in layer/column/time order.
    pub fn occurrence_chunks(&self) -> impl Iterator<Item = &OccurrenceChunk> {
        self.layers
            .iter()
            .flat_map(|layer| layer.columns.iter())
            .flat_map(|column| column.occurrence_chunks())
    }

    /// Find the chunk laid out for `id`.
    pub fn find(&self, id: &OccurrenceId) -> Option<&OccurrenceChunk> {
        self.occurrence_chunks().find(|c| &c.occurrence.id == id)
    }
}

/// A set of columns sharing the same cross-axis scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Column count of the blob this layer belongs to.
    pub total_cols: usize,
    pub columns: Vec<Column>,
}

impl Layer {
    pub fn new(total_cols: usize) -> Self {
        Self {
            total_cols,
            columns: Vec::new(),
        }
    }

    /// Sum of column weights, in blob-column units.
    pub fn span_total(&self) -> f64 {
        self.columns.iter().map(|c| c.span).sum()
    }

    pub fn has_special_span(&self) -> bool {
        self.columns.iter().any(|c| c.special_span.is_some())
    }

    /// Append an empty column covering whatever the columns leave uncovered.
    pub(crate) fn pad_to_total(&mut self) {
        let total = self.total_cols as f64;
        let missing = total - self.span_total();
        if missing > 0.0 {
            let special_span = self.has_special_span().then(|| missing / total);
            self.columns.push(Column {
                span: missing,
                special_span,
                chunks: Vec::new(),
            });
        }
    }
}

/// A slot holding a chronologically non-overlapping run of chunks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Width in blob-column units.
    pub span: f64,
    /// Fraction of the blob width, set when the span does not cover the
    /// whole blob in a multi-column layer.
    pub special_span: Option<f64>,
    pub chunks: Vec<Chunk>,
}

impl Column {
    pub fn empty(special_span: Option<f64>) -> Self {
        Self {
            span: 1.0,
            special_span,
            chunks: Vec::new(),
        }
    }

    pub fn occurrence_chunks(&self) -> impl Iterator<Item = &OccurrenceChunk> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            Chunk::Occurrence(c) => Some(c),
            Chunk::Gap { .. } => None,
        })
    }

    /// End of the last occurrence chunk.
    pub fn cursor(&self) -> Option<NaiveDateTime> {
        self.occurrence_chunks().last().map(|c| c.end)
    }
}

/// Smallest unit of a column's timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Chunk {
    /// Empty time before the next occurrence.
    Gap {
        #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
        duration: Duration,
    },
    Occurrence(OccurrenceChunk),
}

impl Chunk {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Gap { duration } => *duration,
            Self::Occurrence(c) => c.duration,
        }
    }
}

/// Which resize handles a renderer should offer on a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GripBars {
    None,
    Start,
    End,
    Both,
}

impl GripBars {
    pub fn from_visibility(start: bool, end: bool) -> Self {
        match (start, end) {
            (true, true) => Self::Both,
            (true, false) => Self::Start,
            (false, true) => Self::End,
            (false, false) => Self::None,
        }
    }
}

/// An occurrence segment clipped to the visible day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceChunk {
    pub occurrence: Arc<Occurrence>,
    /// Wall-clock start in the column timezone.
    pub start: NaiveDateTime,
    /// Wall-clock end in the column timezone.
    pub end: NaiveDateTime,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub grip_bars: GripBars,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_seconds())
}
