//! OHLCV bar representation and the conventional price-column layout.

use chrono::{DateTime, NaiveDate, NaiveTime};

pub const OPEN: usize = 0;
pub const HIGH: usize = 1;
pub const LOW: usize = 2;
pub const CLOSE: usize = 3;
pub const ADJ_CLOSE: usize = 4;
pub const VOLUME: usize = 5;

/// Header names for the six price columns, in field order.
pub const PRICE_HEADERS: [&str; 6] = ["Open", "High", "Low", "Close", "AdjClose", "Volume"];

const FIELD_NAMES: [&str; 6] = ["open", "high", "low", "close", "adjclose", "volume"];

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Row key for this bar: UNIX seconds at midnight UTC.
    pub fn key(&self) -> i64 {
        self.date.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    /// Field values in column order.
    pub fn values(&self) -> [f64; 6] {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.adj_close,
            self.volume,
        ]
    }
}

/// Inverse of [`OhlcvBar::key`]; `None` when the key is out of chrono's range.
pub fn key_to_date(key: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(key, 0).map(|dt| dt.date_naive())
}

/// Lower-case name of a price field, or its index for derived columns.
pub fn field_name(field: usize) -> String {
    FIELD_NAMES
        .get(field)
        .map(|name| name.to_string())
        .unwrap_or_else(|| field.to_string())
}

/// Accepts a price field name (case-insensitive, `adj_close` allowed) or a
/// numeric column index.
pub fn parse_field(input: &str) -> Option<usize> {
    let lowered = input.trim().to_lowercase().replace('_', "");
    if let Some(pos) = FIELD_NAMES.iter().position(|name| *name == lowered) {
        return Some(pos);
    }
    lowered.parse().ok()
}
