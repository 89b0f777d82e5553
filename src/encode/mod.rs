use crate::metric::{MetricSeries, SeriesError};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};
use thiserror::Error;

pub mod csv;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("csv error")]
    Csv(#[from] ::csv::Error),
    #[error("missing or malformed header: {0}")]
    Header(String),
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid date {value:?}")]
    Date { line: u64, value: String },
    #[error("line {line}: invalid value {value:?} for {metric}")]
    Value {
        line: u64,
        metric: String,
        value: String,
    },
    #[error("decoded rows do not form a valid series")]
    Series(#[from] SeriesError),
}

pub trait Encoder {
    fn encode_series(&mut self, series: &MetricSeries) -> Result<(), CodecError>;
    fn flush(&mut self) -> Result<(), CodecError>;
}

pub trait Decoder {
    fn decode_series(&mut self) -> Result<MetricSeries, CodecError>;
}

pub fn encode_series<W: Write>(writable: W, series: &MetricSeries) -> Result<(), CodecError> {
    let mut encoder = csv::CsvEncoder::new(writable);
    encoder.encode_series(series)?;
    encoder.flush()
}

pub fn decode_series<R: Read>(readable: R) -> Result<MetricSeries, CodecError> {
    csv::CsvDecoder::new(readable).decode_series()
}

pub fn read_series_file(path: &Path) -> Result<MetricSeries, CodecError> {
    decode_series(File::open(path)?)
}

pub fn write_series_file(path: &Path, series: &MetricSeries) -> Result<(), CodecError> {
    encode_series(File::create(path)?, series)
}
