use super::{CodecError, Decoder, Encoder, DATE_FORMAT};
use crate::metric::{MetricRow, MetricSeries};
use chrono::NaiveDate;
use std::io::{Read, Write};

pub struct CsvEncoder<W: Write> {
    writer: ::csv::Writer<W>,
}

impl<W: Write> CsvEncoder<W> {
    pub fn new(writeable: W) -> Self {
        Self {
            writer: ::csv::Writer::from_writer(writeable),
        }
    }
}

impl<W: Write> Encoder for CsvEncoder<W> {
    fn encode_series(&mut self, series: &MetricSeries) -> Result<(), CodecError> {
        let metrics = series.metric_names();
        let mut header = vec!["date"];
        header.extend(metrics.iter().copied());
        self.writer.write_record(&header)?;

        for row in series.rows() {
            let mut record = vec![row.date.format(DATE_FORMAT).to_string()];
            // Every row carries the same metrics, in the same sorted order.
            record.extend(row.values.values().map(|v| v.to_string()));
            self.writer.write_record(&record)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), CodecError> {
        Ok(self.writer.flush()?)
    }
}

pub struct CsvDecoder<R: Read> {
    reader: ::csv::Reader<R>,
}

impl<R: Read> CsvDecoder<R> {
    pub fn new(readable: R) -> Self {
        Self {
            reader: ::csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(::csv::Trim::All)
                .from_reader(readable),
        }
    }

    fn header(&mut self) -> Result<Vec<String>, CodecError> {
        let header = self.reader.headers()?;
        match header.get(0) {
            Some(first) if first.eq_ignore_ascii_case("date") => {}
            _ => {
                return Err(CodecError::Header(format!(
                    "first column must be \"date\", got {:?}",
                    header.get(0).unwrap_or("")
                )))
            }
        }
        let metrics: Vec<String> = header.iter().skip(1).map(str::to_string).collect();
        if let Some(empty) = metrics.iter().position(String::is_empty) {
            return Err(CodecError::Header(format!(
                "column {} has no name",
                empty + 2
            )));
        }
        for (i, metric) in metrics.iter().enumerate() {
            if metrics[..i].contains(metric) {
                return Err(CodecError::Header(format!(
                    "column {:?} appears more than once",
                    metric
                )));
            }
        }
        Ok(metrics)
    }
}

impl<R: Read> Decoder for CsvDecoder<R> {
    fn decode_series(&mut self) -> Result<MetricSeries, CodecError> {
        let metrics = self.header()?;
        let mut rows = vec![];

        for record in self.reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() != metrics.len() + 1 {
                return Err(CodecError::FieldCount {
                    line,
                    expected: metrics.len() + 1,
                    found: record.len(),
                });
            }

            let raw_date = &record[0];
            let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
                CodecError::Date {
                    line,
                    value: raw_date.to_string(),
                }
            })?;

            let mut row = MetricRow::new(date);
            for (metric, raw) in metrics.iter().zip(record.iter().skip(1)) {
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| CodecError::Value {
                        line,
                        metric: metric.clone(),
                        value: raw.to_string(),
                    })?;
                row.values.insert(metric.clone(), value);
            }
            rows.push(row);
        }

        Ok(MetricSeries::new(rows)?)
    }
}
