//! Local market-data provider.
//!
//! The engine consumes an already-validated `PriceSeries`; this crate is the
//! component that produces one. The CSV store below reads per-asset files
//! with `date` and `close` columns, sorts and deduplicates them, and hands
//! the cleaned series over. All file I/O in the system happens here, before
//! the engine is invoked.

use chrono::NaiveDate;
use core_types::{PricePoint, PriceSeries};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

pub mod error;

pub use error::MarketDataError;

/// The abstract interface for a price-history source. The engine's callers
/// depend on this trait, allowing the underlying store (CSV files here, a
/// network provider elsewhere) to be swapped out.
pub trait MarketData {
    /// Fetches the cleaned close-price history for one asset code.
    fn fetch_series(&self, code: &str) -> Result<PriceSeries, MarketDataError>;
}

/// One CSV row. Column names match the yfinance-style export headers,
/// case-insensitively via the serde aliases.
#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close")]
    close: Decimal,
}

/// A price store backed by a directory of `<code>.csv` files.
#[derive(Debug, Clone)]
pub struct CsvMarketData {
    data_dir: PathBuf,
}

impl CsvMarketData {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads a series from an explicit file path.
    pub fn load_file(&self, path: &Path) -> Result<PriceSeries, MarketDataError> {
        let reader = csv::Reader::from_path(path)?;
        let series = read_series(reader, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), rows = series.len(), "loaded price series");
        Ok(series)
    }
}

impl MarketData for CsvMarketData {
    fn fetch_series(&self, code: &str) -> Result<PriceSeries, MarketDataError> {
        let path = self.data_dir.join(format!("{code}.csv"));
        self.load_file(&path)
    }
}

/// Parses, sorts ascending, and deduplicates by date. The engine assumes
/// exactly this contract from its data provider.
fn read_series<R: Read>(
    mut reader: csv::Reader<R>,
    path: &str,
) -> Result<PriceSeries, MarketDataError> {
    let headers = reader.headers()?.clone();
    for column in ["date", "close"] {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(column)) {
            return Err(MarketDataError::MissingColumn {
                path: path.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut points = Vec::new();
    for row in reader.deserialize() {
        let row: PriceRow = row?;
        points.push(PricePoint {
            date: row.date,
            close: row.close,
        });
    }
    if points.is_empty() {
        return Err(MarketDataError::EmptySeries {
            path: path.to_string(),
        });
    }

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    Ok(PriceSeries::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv_text: &str) -> Result<PriceSeries, MarketDataError> {
        read_series(csv::Reader::from_reader(csv_text.as_bytes()), "test.csv")
    }

    #[test]
    fn parses_sorted_rows() {
        let series = parse("date,close\n2023-01-03,101.5\n2023-01-04,102\n").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.first_date(),
            NaiveDate::from_ymd_opt(2023, 1, 3)
        );
    }

    #[test]
    fn accepts_yfinance_style_headers() {
        let series = parse("Date,Close\n2023-01-03,101.5\n").unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn sorts_and_deduplicates_by_date() {
        let series = parse(
            "date,close\n2023-01-05,105\n2023-01-03,101\n2023-01-05,106\n2023-01-04,102\n",
        )
        .unwrap();
        let dates: Vec<String> = series
            .dates()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(dates, vec!["2023-01-03", "2023-01-04", "2023-01-05"]);
    }

    #[test]
    fn missing_close_column_is_reported() {
        let result = parse("date,open\n2023-01-03,100\n");
        assert!(matches!(
            result,
            Err(MarketDataError::MissingColumn { column, .. }) if column == "close"
        ));
    }

    #[test]
    fn header_only_file_is_empty() {
        let result = parse("date,close\n");
        assert!(matches!(result, Err(MarketDataError::EmptySeries { .. })));
    }
}
