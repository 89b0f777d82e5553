use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub date: NaiveDate,
    pub values: BTreeMap<String, f64>,
}

impl MetricRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, metric: &str, value: f64) -> Self {
        self.values.insert(metric.to_string(), value);
        self
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    fn same_metrics(&self, other: &MetricRow) -> bool {
        self.values.len() == other.values.len()
            && self.values.keys().zip(other.values.keys()).all(|(a, b)| a == b)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SeriesError {
    #[error("row dated {0} is earlier than the row before it")]
    Unsorted(NaiveDate),
    #[error("more than one row dated {0}")]
    DuplicateDate(NaiveDate),
    #[error("row dated {0} does not carry the same metrics as the first row")]
    MismatchedMetrics(NaiveDate),
}

/// Date-ordered rows sharing one set of metric names.
///
/// The invariants are checked once in [`MetricSeries::new`]; afterwards the
/// series is read-only, so every consumer can rely on sorted unique dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSeries {
    rows: Vec<MetricRow>,
}

impl MetricSeries {
    pub fn new(rows: Vec<MetricRow>) -> Result<Self, SeriesError> {
        if let Some((first, _)) = rows.split_first() {
            for pair in rows.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                if next.date == prev.date {
                    return Err(SeriesError::DuplicateDate(next.date));
                }
                if next.date < prev.date {
                    return Err(SeriesError::Unsorted(next.date));
                }
            }
            if let Some(row) = rows.iter().find(|r| !r.same_metrics(first)) {
                return Err(SeriesError::MismatchedMetrics(row.date));
            }
        }
        Ok(Self { rows })
    }

    // Only for subsequences of an already validated series.
    pub(crate) fn from_validated(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn last(&self) -> Option<&MetricRow> {
        self.rows.last()
    }

    pub fn metric_names(&self) -> Vec<&str> {
        match self.rows.first() {
            Some(row) => row.values.keys().map(String::as_str).collect(),
            None => vec![],
        }
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.rows
            .first()
            .map_or(false, |row| row.values.contains_key(metric))
    }

    /// Values of one metric in date order.
    pub fn column(&self, metric: &str) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.get(metric).map(|v| (r.date, v)))
            .collect()
    }
}
