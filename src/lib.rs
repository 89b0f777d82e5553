pub mod config;
pub mod dashboard;
pub mod encode;
pub mod kpi;
pub mod mock;
pub mod range;
pub mod render;
pub use metric::{MetricRow, MetricSeries, SeriesError};
pub use range::{filter_by_date, normalize, DateInterval, RangeError, Timeline};

mod metric;
