#![allow(dead_code)]

use barmatrix::domain::error::BarmatrixError;
use barmatrix::domain::matrix::Matrix;
pub use barmatrix::domain::ohlcv::OhlcvBar;
use barmatrix::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BarmatrixError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BarmatrixError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(BarmatrixError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        adj_close: close,
        volume: 1000.0,
    }
}

/// Daily bars with a saw-tooth close so oscillators move in both directions.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + i as f64 * 0.5 + ((i % 6) as f64 - 2.5) * 1.5;
            OhlcvBar {
                date: start + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0 + (i % 3) as f64 * 0.25,
                low: close - 1.0 - (i % 4) as f64 * 0.25,
                close,
                adj_close: close,
                volume: 1000.0 + (i % 5) as f64 * 150.0,
            }
        })
        .collect()
}

/// Single-column matrix keyed 0.. with the given values.
pub fn series(values: &[f64]) -> Matrix {
    let mut m = Matrix::with_headers(["Value"]);
    for (i, &v) in values.iter().enumerate() {
        m.add_row(i as i64).set(0, v);
    }
    m
}

/// Six-column price matrix whose high and low columns are set explicitly.
pub fn high_low_matrix(highs: &[f64], lows: &[f64]) -> Matrix {
    let bars: Vec<OhlcvBar> = highs
        .iter()
        .zip(lows)
        .enumerate()
        .map(|(i, (&high, &low))| OhlcvBar {
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            open: (high + low) / 2.0,
            high,
            low,
            close: (high + low) / 2.0,
            adj_close: (high + low) / 2.0,
            volume: 100.0,
        })
        .collect();
    Matrix::from_bars(&bars)
}

pub fn write_csv(dir: &std::path::Path, name: &str, bars: &[OhlcvBar]) -> std::path::PathBuf {
    let mut content = String::from("date,open,high,low,close,adj_close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.adj_close,
            b.volume
        ));
    }
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
