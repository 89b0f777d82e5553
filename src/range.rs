use crate::metric::{MetricRow, MetricSeries};
use chrono::{Duration, NaiveDate};
use log::debug;
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("interval start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("normalization divisor is zero")]
    DivisionByZero,
    #[error("normalization bounds are inverted: min {min} > max {max}")]
    InvalidBounds { min: f64, max: f64 },
    #[error("normalized value is not a number")]
    NotANumber,
    #[error("unknown timeline {0:?}")]
    UnknownTimeline(String),
    #[error("a {days} day window ending {end} starts before the earliest supported date")]
    DateOverflow { end: NaiveDate, days: i64 },
}

/// Closed date interval, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    fn validate(&self) -> Result<(), RangeError> {
        if self.start > self.end {
            return Err(RangeError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The `days` dates ending on `end`. Non-positive counts give `[end, end]`.
    pub fn ending(end: NaiveDate, days: i64) -> Result<Self, RangeError> {
        let start = Duration::try_days(days.max(1) - 1)
            .and_then(|back| end.checked_sub_signed(back))
            .ok_or(RangeError::DateOverflow { end, days })?;
        Ok(Self { start, end })
    }
}

/// Returns the rows of `series` dated within `interval`, in series order.
///
/// Rows are sorted by date, so the bounds are located by binary search
/// instead of scanning every row.
pub fn filter_by_date(
    series: &MetricSeries,
    interval: &DateInterval,
) -> Result<MetricSeries, RangeError> {
    interval.validate()?;

    let rows = series.rows();
    let (first, last) = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(MetricSeries::default()),
    };
    if first > interval.end || last < interval.start {
        // Out of range
        debug!(
            "interval {}..={} misses series {}..={}",
            interval.start, interval.end, first, last
        );
        return Ok(MetricSeries::default());
    }

    let start_idx = if interval.start <= first {
        0
    } else {
        rows.partition_point(|r| r.date < interval.start)
    };
    let end_idx = if interval.end >= last {
        rows.len()
    } else {
        rows.partition_point(|r| r.date <= interval.end)
    };

    let selected: Vec<MetricRow> = rows[start_idx..end_idx].to_vec();
    debug!(
        "selected {} of {} rows for {}..={}",
        selected.len(),
        rows.len(),
        interval.start,
        interval.end
    );
    Ok(MetricSeries::from_validated(selected))
}

/// Maps `value / divisor` onto `[min, max]`.
pub fn normalize(value: f64, divisor: f64, min: f64, max: f64) -> Result<f64, RangeError> {
    if divisor == 0.0 {
        return Err(RangeError::DivisionByZero);
    }
    // f64::clamp panics on NaN bounds.
    if min.is_nan() || max.is_nan() || min > max {
        return Err(RangeError::InvalidBounds { min, max });
    }
    let scaled = value / divisor;
    if scaled.is_nan() {
        return Err(RangeError::NotANumber);
    }
    Ok(scaled.clamp(min, max))
}

/// Preset windows offered by the timeline selector, ending at an anchor date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Timeline {
    #[default]
    Last7Days,
    Last30Days,
    Quarter,
    Year,
}

impl Timeline {
    pub const ALL: [Timeline; 4] = [
        Timeline::Last7Days,
        Timeline::Last30Days,
        Timeline::Quarter,
        Timeline::Year,
    ];

    pub fn days(&self) -> i64 {
        match self {
            Timeline::Last7Days => 7,
            Timeline::Last30Days => 30,
            Timeline::Quarter => 90,
            Timeline::Year => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeline::Last7Days => "Last 7 days",
            Timeline::Last30Days => "Last 30 days",
            Timeline::Quarter => "Quarter",
            Timeline::Year => "Year",
        }
    }

    pub fn interval(&self, anchor: NaiveDate) -> Result<DateInterval, RangeError> {
        DateInterval::ending(anchor, self.days())
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeline {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        let short = match needle.as_str() {
            "7d" => Some(Timeline::Last7Days),
            "30d" => Some(Timeline::Last30Days),
            _ => None,
        };
        short
            .or_else(|| {
                Timeline::ALL
                    .into_iter()
                    .find(|t| t.label().to_lowercase() == needle)
            })
            .ok_or_else(|| RangeError::UnknownTimeline(s.to_string()))
    }
}
