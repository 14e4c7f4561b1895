//! Per-column layout context.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::config::{Config, MAX_MINIMUM_DURATION_MINUTES, MINUTES_PER_DAY};
use crate::error::ValidationError;

/// Everything a recompute needs to know about the column it lays out.
///
/// Supplied by the caller and assumed stable for the duration of one
/// recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnContext {
    /// Calendar date shown by the column.
    pub date: NaiveDate,
    /// Timezone all occurrence instants are converted into.
    pub timezone: Tz,
    /// First visible minute of the day.
    pub day_start_minute: u32,
    /// End of the visible range, in minutes from midnight.
    pub day_end_minute: u32,
    /// Shortest displayed duration of any occurrence.
    pub minimum_duration_minutes: i64,
}

impl ColumnContext {
    /// A full-day context with no minimum duration.
    pub fn new(date: NaiveDate, timezone: Tz) -> Self {
        Self {
            date,
            timezone,
            day_start_minute: 0,
            day_end_minute: MINUTES_PER_DAY,
            minimum_duration_minutes: 0,
        }
    }

    /// Build the context for `date` from the view configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured timezone is unknown.
    pub fn from_config(date: NaiveDate, config: &Config) -> Result<Self, ValidationError> {
        let view = &config.view;
        Ok(Self {
            date,
            timezone: view.tz()?,
            day_start_minute: view.day_start_minute,
            day_end_minute: view.day_end_minute.min(MINUTES_PER_DAY),
            minimum_duration_minutes: Self::minimum_duration_for(
                view.min_event_size_px,
                view.pixels_per_minute,
            ),
        })
    }

    /// Restrict the visible minute range.
    pub fn with_visible_minutes(mut self, start: u32, end: u32) -> Self {
        self.day_end_minute = end.min(MINUTES_PER_DAY);
        self.day_start_minute = start.min(self.day_end_minute);
        self
    }

    /// Set the minimum duration, clamped to one day.
    pub fn with_minimum_duration(mut self, minutes: i64) -> Self {
        self.minimum_duration_minutes = minutes.clamp(0, MAX_MINIMUM_DURATION_MINUTES);
        self
    }

    /// Minutes needed for a box of `min_size_px` to be drawn at
    /// `pixels_per_minute`, at most one day. Non-positive densities are
    /// clamped to 0.01.
    pub fn minimum_duration_for(min_size_px: f64, pixels_per_minute: f64) -> i64 {
        let ppm = if pixels_per_minute > 0.0 {
            pixels_per_minute
        } else {
            0.01
        };
        let minutes = (min_size_px.max(0.0) / ppm).trunc();
        minutes.min(MAX_MINIMUM_DURATION_MINUTES as f64) as i64
    }

    pub fn minimum_duration(&self) -> Duration {
        Duration::minutes(self.minimum_duration_minutes)
    }

    /// Wall-clock start of the visible range.
    pub fn view_start(&self) -> NaiveDateTime {
        self.minute_of_day(self.day_start_minute)
    }

    /// Wall-clock end of the visible range. Minute 1440 is the next midnight.
    pub fn view_end(&self) -> NaiveDateTime {
        self.minute_of_day(self.day_end_minute)
    }

    fn minute_of_day(&self, minute: u32) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute))
    }
}
