use crate::{
    metric::{MetricRow, MetricSeries},
    range::RangeError,
};
use chrono::{Duration, NaiveDate};
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const ACTIVE_USERS: &str = "active_users";
pub const CSAT: &str = "csat";
pub const NPS: &str = "nps";
pub const RESOLUTION_RATE: &str = "resolution_rate";

/// Seeded source of daily mock KPI rows.
pub struct MockGenerator {
    rng: StdRng,
}

impl MockGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One row per day from `start`. Fails if the last day is past `NaiveDate::MAX`.
    pub fn generate(&mut self, start: NaiveDate, days: u32) -> Result<MetricSeries, RangeError> {
        let rows = (0..i64::from(days))
            .map(|offset| {
                let date = start
                    .checked_add_signed(Duration::days(offset))
                    .ok_or(RangeError::DateOverflow {
                        end: start,
                        days: i64::from(days),
                    })?;
                Ok(MetricRow::new(date)
                    .with(ACTIVE_USERS, self.rng.gen_range(0..=600) as f64)
                    .with(CSAT, self.rng.gen_range(60..=100) as f64)
                    .with(NPS, self.rng.gen_range(40..=90) as f64)
                    .with(RESOLUTION_RATE, self.rng.gen_range(50..=100) as f64))
            })
            .collect::<Result<Vec<_>, RangeError>>()?;
        debug!("generated {} mock rows starting {}", rows.len(), start);
        // One row per consecutive day with a fixed metric set.
        Ok(MetricSeries::from_validated(rows))
    }
}

#[cfg(test)]
pub mod tests {
    use chrono::NaiveDate;

    use super::{MockGenerator, ACTIVE_USERS, CSAT, NPS, RESOLUTION_RATE};
    use crate::{metric::MetricSeries, range::RangeError};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = MockGenerator::new(42).generate(start(), 30).unwrap();
        let b = MockGenerator::new(42).generate(start(), 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_series_is_valid() {
        let series = MockGenerator::new(7).generate(start(), 45).unwrap();
        assert_eq!(series.len(), 45);
        assert_eq!(
            MetricSeries::new(series.rows().to_vec()).unwrap(),
            series
        );
        assert_eq!(
            series.metric_names(),
            vec![ACTIVE_USERS, CSAT, NPS, RESOLUTION_RATE]
        );
        for row in series.rows() {
            let users = row.get(ACTIVE_USERS).unwrap();
            assert!((0.0..=600.0).contains(&users));
            let csat = row.get(CSAT).unwrap();
            assert!((60.0..=100.0).contains(&csat));
        }
    }

    #[test]
    fn test_zero_days() {
        assert!(MockGenerator::new(1).generate(start(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_generate_past_max_date() {
        assert!(matches!(
            MockGenerator::new(1).generate(NaiveDate::MAX, 2),
            Err(RangeError::DateOverflow { days: 2, .. })
        ));
        assert_eq!(
            MockGenerator::new(1).generate(NaiveDate::MAX, 1).unwrap().len(),
            1
        );
    }
}
