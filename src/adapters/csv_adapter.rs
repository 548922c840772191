//! CSV bar files: one `<symbol>.csv` per symbol under a base directory.
//!
//! Columns are located by header name (`date,open,high,low,close,volume`,
//! with an optional `adj_close`), so their order does not matter. Dates are
//! `YYYY-MM-DD`; bars are returned sorted by date.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::error::BarmatrixError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Layout {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adj_close: Option<usize>,
    volume: usize,
}

fn data_error(reason: impl Into<String>) -> BarmatrixError {
    BarmatrixError::Data {
        reason: reason.into(),
    }
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, BarmatrixError> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_lowercase().replace(['_', ' '], ""))
            .collect();
        let find = |name: &str| names.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| data_error(format!("missing {} column", name)))
        };
        Ok(Self {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            adj_close: find("adjclose"),
            volume: require("volume")?,
        })
    }
}

fn number(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<f64, BarmatrixError> {
    let raw = record
        .get(index)
        .ok_or_else(|| data_error(format!("line {}: missing {} value", line, name)))?;
    raw.trim()
        .parse()
        .map_err(|e| data_error(format!("line {}: invalid {} value '{}': {}", line, name, raw, e)))
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Reads bars from a single CSV file.
    pub fn read_file(path: &Path) -> Result<Vec<OhlcvBar>, BarmatrixError> {
        let file = fs::File::open(path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;
        Self::read_bars(file)
    }

    /// Reads bars from any CSV source with a header row.
    pub fn read_bars<R: io::Read>(reader: R) -> Result<Vec<OhlcvBar>, BarmatrixError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error: {}", e)))?
            .clone();
        let layout = Layout::from_headers(&headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let date_str = record
                .get(layout.date)
                .ok_or_else(|| data_error(format!("line {}: missing date", line)))?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                data_error(format!("line {}: invalid date '{}': {}", line, date_str, e))
            })?;

            let close = number(&record, layout.close, "close", line)?;
            let adj_close = match layout.adj_close {
                Some(index) => number(&record, index, "adj_close", line)?,
                None => close,
            };
            bars.push(OhlcvBar {
                date,
                open: number(&record, layout.open, "open", line)?,
                high: number(&record, layout.high, "high", line)?,
                low: number(&record, layout.low, "low", line)?,
                close,
                adj_close,
                volume: number(&record, layout.volume, "volume", line)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Symbols with a CSV file in the base directory, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, BarmatrixError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BarmatrixError> {
        let path = self.csv_path(symbol);
        let bars = Self::read_file(&path)?;
        debug!(symbol, path = %path.display(), bars = bars.len(), "loaded bars");
        if bars.is_empty() {
            return Err(BarmatrixError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("CBA.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("BHP").unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adj_close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    }

    #[test]
    fn fetch_bars_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_bars("XYZ"),
            Err(BarmatrixError::Data { .. })
        ));
    }

    #[test]
    fn empty_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_bars("CBA"),
            Err(BarmatrixError::NoData { ref symbol }) if symbol == "CBA"
        ));
    }

    #[test]
    fn columns_are_found_by_header() {
        let content = "Date, Volume, Close, Adj Close, Low, High, Open\n\
            2024-02-01, 900, 10.5, 10.25, 9.5, 11, 10\n";
        let bars = CsvAdapter::read_bars(content.as_bytes()).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 10.0);
        assert_eq!(bars[0].high, 11.0);
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[0].adj_close, 10.25);
        assert_eq!(bars[0].volume, 900.0);
    }

    #[test]
    fn missing_column_is_reported() {
        let content = "date,open,high,close,volume\n2024-02-01,1,2,1.5,10\n";
        let err = CsvAdapter::read_bars(content.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing low column"));
    }

    #[test]
    fn bad_value_names_the_line() {
        let content = "date,open,high,low,close,volume\n\
            2024-02-01,1,2,0.5,1.5,10\n\
            2024-02-02,1,x,0.5,1.5,10\n";
        let err = CsvAdapter::read_bars(content.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 3"), "{}", message);
        assert!(message.contains("high"));
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["BHP", "CBA"]);
    }
}
