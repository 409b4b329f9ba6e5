//! Business-hours clock.
//!
//! Converts an instant interval into office hours on weekdays, in the
//! configured timezone, optionally capped per day and optionally clipped to
//! the query timeframe.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use devpulse_core::{BusinessHoursConfig, ConfigError, Time};

/// Business-hours clock built once per run from [`BusinessHoursConfig`].
#[derive(Debug, Clone)]
pub struct BusinessHoursClock {
    office_start: NaiveTime,
    office_end: NaiveTime,
    max_hours_per_day: f64,
    tz: Tz,
    timeframe_start: Option<Time>,
    timeframe_end: Option<Time>,
}

impl BusinessHoursClock {
    /// Create a clock, validating the configuration.
    pub fn new(config: &BusinessHoursConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let invalid = || ConfigError::InvalidOfficeHours {
            start: config.office_start_hour,
            end: config.office_end_hour,
        };
        let office_start = NaiveTime::from_hms_opt(config.office_start_hour, 0, 0).ok_or_else(invalid)?;
        let office_end = NaiveTime::from_hms_opt(config.office_end_hour, 0, 0).ok_or_else(invalid)?;
        let (timeframe_start, timeframe_end) = config.timeframe_bounds();

        Ok(Self {
            office_start,
            office_end,
            max_hours_per_day: config.max_hours_per_day,
            tz: config.tz()?,
            timeframe_start,
            timeframe_end,
        })
    }

    /// Timezone the office window is evaluated in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Daily cap applied to capped accounting.
    pub fn max_hours_per_day(&self) -> f64 {
        self.max_hours_per_day
    }

    /// Office hours between `start` and `end`, skipping weekends.
    ///
    /// Returns 0.0 when `start >= end`. With `counts_all_hours` false each
    /// day's contribution is capped at `max_hours_per_day`.
    pub fn duration_hours(&self, start: Time, end: Time, counts_all_hours: bool) -> f64 {
        if start >= end {
            return 0.0;
        }

        let local_start = start.with_timezone(&self.tz).naive_local();
        let local_end = end.with_timezone(&self.tz).naive_local();

        if local_start.date() == local_end.date() {
            return self.day_hours(local_start.date(), local_start, local_end, counts_all_hours);
        }

        self.sum_over_days(local_start, local_end, counts_all_hours)
    }

    /// Capped office hours after clipping to the configured timeframe.
    ///
    /// This is the accounting used for productive states.
    pub fn productive_hours(&self, start: Time, end: Time) -> f64 {
        match self.clip_to_timeframe(start, end) {
            Some((start, end)) => self.duration_hours(start, end, false),
            None => 0.0,
        }
    }

    /// Clamp an interval to the timeframe; `None` when nothing remains.
    pub fn clip_to_timeframe(&self, start: Time, end: Time) -> Option<(Time, Time)> {
        let start = match self.timeframe_start {
            Some(bound) if start < bound => bound,
            _ => start,
        };
        let end = match self.timeframe_end {
            Some(bound) if end > bound => bound,
            _ => end,
        };
        (start < end).then_some((start, end))
    }

    /// General multi-day walk over local calendar dates, inclusive.
    fn sum_over_days(&self, local_start: NaiveDateTime, local_end: NaiveDateTime, counts_all_hours: bool) -> f64 {
        let first = local_start.date();
        let last = local_end.date();
        let mut total = 0.0;
        let mut date = first;

        while date <= last {
            let day_start = if date == first {
                local_start
            } else {
                date.and_time(NaiveTime::MIN)
            };
            let next = date.succ_opt();
            let day_end = match next {
                Some(next) if date != last => next.and_time(NaiveTime::MIN),
                _ => local_end,
            };

            total += self.day_hours(date, day_start, day_end, counts_all_hours);

            match next {
                Some(next) => date = next,
                None => break,
            }
        }

        total
    }

    /// Overlap of `[from, to)` with the office window of `date`.
    fn day_hours(&self, date: NaiveDate, from: NaiveDateTime, to: NaiveDateTime, counts_all_hours: bool) -> f64 {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return 0.0;
        }

        let effective_start = from.max(date.and_time(self.office_start));
        let effective_end = to.min(date.and_time(self.office_end));
        if effective_start >= effective_end {
            return 0.0;
        }

        let hours = (effective_end - effective_start).num_milliseconds() as f64 / 3_600_000.0;
        if counts_all_hours {
            hours
        } else {
            hours.min(self.max_hours_per_day)
        }
    }
}
