//! Turning a column's assignments into gap and occurrence chunks.
//!
//! All arithmetic here runs on zone-stripped wall-clock values. Gap sizes
//! are elapsed-time quantities on the drawn axis, and subtracting
//! `NaiveDateTime`s keeps a daylight-saving jump from adding or removing
//! an hour of blank space.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use super::clip::OccurrenceInterval;
use super::context::ColumnContext;
use super::tree::{Chunk, Column, GripBars, OccurrenceChunk};

/// Appends chunks to columns, clipped to one column's visible day.
#[derive(Debug, Clone)]
pub struct ChunkSequencer {
    timezone: Tz,
    view_start: NaiveDateTime,
    view_end: NaiveDateTime,
}

impl ChunkSequencer {
    pub fn new(ctx: &ColumnContext) -> Self {
        let view_start = ctx.view_start();
        Self {
            timezone: ctx.timezone,
            view_start,
            view_end: ctx.view_end().max(view_start),
        }
    }

    fn clamp(&self, at: NaiveDateTime) -> NaiveDateTime {
        at.clamp(self.view_start, self.view_end)
    }

    fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.timezone).naive_local()
    }

    /// Append `interval` to `column`, preceded by a gap chunk when it does
    /// not start where the previous chunk ended.
    ///
    /// Intervals must arrive in start order.
    pub fn append(&self, column: &mut Column, interval: &OccurrenceInterval) {
        let start = self.clamp(interval.layout_start.naive_local());
        let end = self.clamp(interval.layout_end.naive_local()).max(start);

        let prev_end = column.cursor().unwrap_or(self.view_start);
        let gap = start - prev_end;
        if gap > chrono::Duration::zero() {
            column.chunks.push(Chunk::Gap { duration: gap });
        }

        column.chunks.push(Chunk::Occurrence(OccurrenceChunk {
            occurrence: interval.occurrence.clone(),
            start,
            end,
            duration: end - start,
            grip_bars: self.grip_bars(interval, start, end),
        }));
    }

    /// Resize handles: hidden for tasks carrying only one of entry/due;
    /// otherwise shown where the chunk reaches the occurrence's own edge.
    fn grip_bars(
        &self,
        interval: &OccurrenceInterval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> GripBars {
        let occurrence = &interval.occurrence;
        if occurrence.has_single_task_date() {
            return GripBars::None;
        }
        let start_visible = occurrence
            .start_date
            .or(occurrence.entry_date)
            .is_some_and(|s| self.local(s) == start);
        let end_visible = occurrence
            .end_date
            .or(occurrence.due_date)
            .is_some_and(|e| self.local(e) <= end);
        GripBars::from_visibility(start_visible, end_visible)
    }
}
