//! Blob partitioning and column allocation.
//!
//! A blob is a maximal run of occurrences with no idle time inside it. The
//! sweep walks intervals in [`compare_intervals`](super::clip::compare_intervals)
//! order, closing a blob whenever the next interval starts at or after the
//! latest end seen so far. Within a blob each interval is placed by the first
//! strategy that succeeds:
//!
//! ```text
//! Reuse  -> a tracked column whose tail ended, plus free neighbours
//! Shrink -> a tail spanning 2+ columns gives up all but its first column
//! Create -> a new column; finished assignments ending at the old edge grow
//! ```

use chrono::DateTime;
use chrono_tz::Tz;
use std::ops::Range;

use super::clip::OccurrenceInterval;
use crate::error::LayoutError;

/// An interval placed into a blob's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAssignment {
    pub interval: OccurrenceInterval,
    pub start_col: usize,
    pub col_span: usize,
}

impl ColumnAssignment {
    /// One past the last column covered.
    pub fn end_col(&self) -> usize {
        self.start_col + self.col_span
    }
}

/// A finished group of overlapping assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub assignments: Vec<ColumnAssignment>,
    pub total_cols: usize,
}

/// Which placement strategy an interval ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Reuse,
    Shrink,
    Create,
}

/// Column index -> index of the assignment at that column's tail.
#[derive(Debug, Default)]
struct ColumnEndTracker {
    tails: Vec<usize>,
}

impl ColumnEndTracker {
    fn len(&self) -> usize {
        self.tails.len()
    }

    fn get(&self, col: usize) -> Result<usize, LayoutError> {
        self.tails
            .get(col)
            .copied()
            .ok_or(LayoutError::ColumnOutOfRange {
                index: col,
                total_cols: self.tails.len(),
            })
    }

    fn fill(&mut self, cols: Range<usize>, assignment: usize) -> Result<(), LayoutError> {
        let total_cols = self.tails.len();
        let slots = self
            .tails
            .get_mut(cols.clone())
            .ok_or(LayoutError::ColumnOutOfRange {
                index: cols.end.saturating_sub(1),
                total_cols,
            })?;
        slots.fill(assignment);
        Ok(())
    }

    fn push(&mut self, assignment: usize) {
        self.tails.push(assignment);
    }
}

/// Allocation state for the blob currently being swept.
#[derive(Debug, Default)]
struct BlobBuilder {
    assignments: Vec<ColumnAssignment>,
    tracker: ColumnEndTracker,
}

impl BlobBuilder {
    fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn finish(self) -> Blob {
        Blob {
            total_cols: self.tracker.len(),
            assignments: self.assignments,
        }
    }

    fn tail_end(&self, col: usize) -> Result<DateTime<Tz>, LayoutError> {
        let index = self.tracker.get(col)?;
        self.assignments
            .get(index)
            .map(|a| a.interval.layout_end)
            .ok_or(LayoutError::MissingAssignment {
                index,
                len: self.assignments.len(),
            })
    }

    fn push(&mut self, interval: OccurrenceInterval, start_col: usize, col_span: usize) -> usize {
        self.assignments.push(ColumnAssignment {
            interval,
            start_col,
            col_span,
        });
        self.assignments.len() - 1
    }

    fn place(&mut self, interval: OccurrenceInterval) -> Result<Placement, LayoutError> {
        let start = interval.layout_start;

        if let Some(cols) = self.find_reusable(start)? {
            let index = self.push(interval, cols.start, cols.len());
            self.tracker.fill(cols, index)?;
            return Ok(Placement::Reuse);
        }

        if let Some(shrunk) = self.find_shrinkable()? {
            let (old_start, old_span) = {
                let a = &self.assignments[shrunk];
                (a.start_col, a.col_span)
            };
            let cols = old_start + 1..old_start + old_span;
            let index = self.push(interval, cols.start, cols.len());
            self.tracker.fill(cols, index)?;
            self.assignments[shrunk].col_span = 1;
            return Ok(Placement::Shrink);
        }

        let old_total = self.tracker.len();
        for assignment in &mut self.assignments {
            if assignment.end_col() == old_total && assignment.interval.layout_end <= start {
                assignment.col_span += 1;
            }
        }
        let index = self.push(interval, old_total, 1);
        self.tracker.push(index);
        Ok(Placement::Create)
    }

    /// Lowest free column and the free columns directly after it.
    fn find_reusable(&self, start: DateTime<Tz>) -> Result<Option<Range<usize>>, LayoutError> {
        for first in 0..self.tracker.len() {
            if self.tail_end(first)? > start {
                continue;
            }
            let mut last = first + 1;
            while last < self.tracker.len() && self.tail_end(last)? <= start {
                last += 1;
            }
            return Ok(Some(first..last));
        }
        Ok(None)
    }

    /// Index of the first tail assignment occupying two adjacent columns.
    fn find_shrinkable(&self) -> Result<Option<usize>, LayoutError> {
        for col in 1..self.tracker.len() {
            let tail = self.tracker.get(col)?;
            if tail != self.tracker.get(col - 1)? {
                continue;
            }
            let assignment = self
                .assignments
                .get(tail)
                .ok_or(LayoutError::MissingAssignment {
                    index: tail,
                    len: self.assignments.len(),
                })?;
            if assignment.col_span < 2 {
                return Err(LayoutError::ColumnOutOfRange {
                    index: col,
                    total_cols: self.tracker.len(),
                });
            }
            return Ok(Some(tail));
        }
        Ok(None)
    }
}

/// Sweep sorted intervals into blobs with column assignments.
///
/// `intervals` must already be sorted with
/// [`sort_intervals`](super::clip::sort_intervals).
pub fn partition_blobs(intervals: Vec<OccurrenceInterval>) -> Result<Vec<Blob>, LayoutError> {
    let mut blobs = Vec::new();
    let mut current = BlobBuilder::default();
    let mut latest_end: Option<DateTime<Tz>> = None;

    for interval in intervals {
        if let Some(latest) = latest_end {
            if !current.is_empty() && interval.layout_start >= latest {
                blobs.push(std::mem::take(&mut current).finish());
            }
        }

        let end = interval.layout_end;
        let placement = current.place(interval)?;
        tracing::trace!(?placement, cols = current.tracker.len(), "placed interval");

        latest_end = Some(match latest_end {
            Some(latest) if latest > end => latest,
            _ => end,
        });
    }

    if !current.is_empty() {
        blobs.push(current.finish());
    }
    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::clip::{clip_occurrence, sort_intervals};
    use crate::layout::context::ColumnContext;
    use crate::occurrence::Occurrence;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::Arc;

    fn at(h: u32, m: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    fn blobs(events: &[(&str, (u32, u32), (u32, u32))]) -> Vec<Blob> {
        let ctx = ColumnContext::new(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), chrono_tz::UTC);
        let mut intervals: Vec<_> = events
            .iter()
            .map(|(id, s, e)| {
                let occ = Arc::new(Occurrence::event(*id, *id, at(s.0, s.1), at(e.0, e.1)));
                clip_occurrence(&occ, &ctx).unwrap()
            })
            .collect();
        sort_intervals(&mut intervals);
        partition_blobs(intervals).unwrap()
    }

    fn slots(blob: &Blob) -> Vec<(&str, usize, usize)> {
        blob.assignments
            .iter()
            .map(|a| (a.interval.id().as_str(), a.start_col, a.col_span))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(blobs(&[]).is_empty());
    }

    #[test]
    fn test_two_overlapping_events_share_blob() {
        let result = blobs(&[("a", (9, 0), (10, 0)), ("b", (9, 30), (10, 30))]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_cols, 2);
        assert_eq!(slots(&result[0]), [("a", 0, 1), ("b", 1, 1)]);
    }

    #[test]
    fn test_idle_gap_splits_blobs() {
        let result = blobs(&[("a", (9, 0), (9, 30)), ("b", (10, 0), (10, 30))]);
        assert_eq!(result.len(), 2);
        assert_eq!(slots(&result[0]), [("a", 0, 1)]);
        assert_eq!(slots(&result[1]), [("b", 0, 1)]);
        assert!(result.iter().all(|b| b.total_cols == 1));
    }

    #[test]
    fn test_touching_events_split_blobs() {
        let result = blobs(&[("a", (9, 0), (10, 0)), ("b", (10, 0), (11, 0))]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_nested_event_then_reuse() {
        // a contains b and c; c starts exactly when b ends.
        let result = blobs(&[
            ("a", (9, 0), (11, 0)),
            ("b", (9, 15), (9, 45)),
            ("c", (9, 45), (10, 15)),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_cols, 2);
        assert_eq!(slots(&result[0]), [("a", 0, 1), ("b", 1, 1), ("c", 1, 1)]);
    }

    #[test]
    fn test_create_grows_finished_trailing_assignment() {
        let result = blobs(&[
            ("a", (9, 0), (11, 0)),
            ("x", (9, 0), (9, 30)),
            ("y", (9, 30), (10, 30)),
            ("z", (10, 0), (10, 15)),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_cols, 3);
        assert_eq!(
            slots(&result[0]),
            [("a", 0, 1), ("x", 1, 2), ("y", 1, 1), ("z", 2, 1)]
        );
    }

    #[test]
    fn test_reuse_extends_over_free_neighbours() {
        let result = blobs(&[
            ("a", (9, 0), (12, 0)),
            ("b", (9, 0), (9, 30)),
            ("c", (9, 15), (9, 45)),
            ("d", (9, 45), (11, 0)),
        ]);
        assert_eq!(result[0].total_cols, 3);
        assert_eq!(
            slots(&result[0]),
            [("a", 0, 1), ("b", 1, 1), ("c", 2, 1), ("d", 1, 2)]
        );
    }

    #[test]
    fn test_shrink_wide_tail() {
        let result = blobs(&[
            ("a", (9, 0), (12, 0)),
            ("b", (9, 0), (9, 30)),
            ("c", (9, 15), (9, 45)),
            ("d", (9, 45), (11, 0)),
            ("e", (10, 0), (10, 30)),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_cols, 3);
        assert_eq!(
            slots(&result[0]),
            [("a", 0, 1), ("b", 1, 1), ("c", 2, 1), ("d", 1, 1), ("e", 2, 1)]
        );
    }

    #[test]
    fn test_identical_events_get_own_columns() {
        let result = blobs(&[
            ("a", (9, 0), (10, 0)),
            ("b", (9, 0), (10, 0)),
            ("c", (9, 0), (10, 0)),
        ]);
        assert_eq!(result[0].total_cols, 3);
        assert_eq!(slots(&result[0]), [("a", 0, 1), ("b", 1, 1), ("c", 2, 1)]);
    }

    #[test]
    fn test_assignments_stay_within_total_cols() {
        let result = blobs(&[
            ("a", (8, 0), (12, 0)),
            ("b", (8, 30), (9, 0)),
            ("c", (8, 45), (10, 0)),
            ("d", (9, 0), (9, 30)),
            ("e", (9, 10), (11, 0)),
            ("f", (9, 30), (9, 40)),
            ("g", (10, 0), (10, 20)),
        ]);
        for blob in &result {
            for a in &blob.assignments {
                assert!(a.col_span >= 1);
                assert!(a.end_col() <= blob.total_cols);
            }
        }
    }
}
