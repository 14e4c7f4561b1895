//! Resolving occurrences into displayed intervals.
//!
//! An occurrence's displayed interval comes from the fallback chains on
//! [`Occurrence`], converted into the column's timezone and stretched to the
//! column's minimum displayed duration.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use std::cmp::Ordering;
use std::sync::Arc;

use super::context::ColumnContext;
use crate::config::MINUTES_PER_DAY;
use crate::occurrence::{Occurrence, OccurrenceId};

/// An occurrence with its displayed start and end in the column timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceInterval {
    pub occurrence: Arc<Occurrence>,
    pub layout_start: DateTime<Tz>,
    pub layout_end: DateTime<Tz>,
}

impl OccurrenceInterval {
    pub fn id(&self) -> &OccurrenceId {
        &self.occurrence.id
    }
}

/// Resolve and pad the displayed interval of `occurrence`.
///
/// Returns `None` when the occurrence has neither a start nor an end to
/// fall back on, or when padding it runs past the representable range.
pub fn clip_occurrence(
    occurrence: &Arc<Occurrence>,
    ctx: &ColumnContext,
) -> Option<OccurrenceInterval> {
    let layout_start = occurrence.display_start()?.with_timezone(&ctx.timezone);
    let mut layout_end = occurrence.display_end()?.with_timezone(&ctx.timezone);

    // Only ever grows.
    let min_end = layout_start.checked_add_signed(ctx.minimum_duration())?;
    if min_end > layout_end {
        layout_end = min_end;
    }

    Some(OccurrenceInterval {
        occurrence: Arc::clone(occurrence),
        layout_start,
        layout_end,
    })
}

/// Start ascending, then end descending so that containing intervals come
/// first, then id.
pub fn compare_intervals(a: &OccurrenceInterval, b: &OccurrenceInterval) -> Ordering {
    a.layout_start
        .cmp(&b.layout_start)
        .then_with(|| b.layout_end.cmp(&a.layout_end))
        .then_with(|| a.id().cmp(b.id()))
}

pub fn sort_intervals(intervals: &mut [OccurrenceInterval]) {
    intervals.sort_by(compare_intervals);
}

/// Minute positions of an occurrence relative to a column's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceMinutes {
    /// Start minute within the column day; 0 if it starts on an earlier day.
    pub start: i64,
    /// End minute within the column day; 1440 if it ends on a later day.
    pub end: i64,
    /// Start relative to 00:00 of the column date. Negative for occurrences
    /// that began on an earlier day.
    pub real_start: i64,
    /// End relative to 00:00 of the column date.
    pub real_end: i64,
}

/// Position `occurrence` against the column's date without any padding.
pub fn occurrence_minutes(
    occurrence: &Occurrence,
    ctx: &ColumnContext,
) -> Option<OccurrenceMinutes> {
    let start = occurrence
        .display_start()?
        .with_timezone(&ctx.timezone)
        .naive_local();
    let end = occurrence
        .display_end()?
        .with_timezone(&ctx.timezone)
        .naive_local();
    let midnight = ctx.date.and_time(NaiveTime::MIN);

    let start_minute = if start.date() < ctx.date {
        0
    } else {
        minute_of(start)
    };
    let end_minute = if end.date() > ctx.date {
        i64::from(MINUTES_PER_DAY)
    } else {
        minute_of(end)
    };

    Some(OccurrenceMinutes {
        start: start_minute,
        end: end_minute,
        real_start: (start - midnight).num_minutes(),
        real_end: (end - midnight).num_minutes(),
    })
}

fn minute_of(at: NaiveDateTime) -> i64 {
    i64::from(at.hour() * 60 + at.minute())
}
