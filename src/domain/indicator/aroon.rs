//! Aroon Up / Aroon Down.
//!
//! Over the last n+1 bars:
//! Up = 100 * (n - bars since highest high) / n
//! Down = 100 * (n - bars since lowest low) / n
//! The most recent bar wins a tie. Result columns: Up (returned), Down (+1).
//! Warmup: first n rows are zero.

use crate::domain::column::Column;
use crate::domain::indicator::IndicatorType;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{HIGH, LOW};

pub fn aroon(m: &mut Matrix, period: usize) -> Column {
    let name = IndicatorType::Aroon(period).to_string();
    let up = m.add_named_column(name.clone());
    let down = m.add_named_column(format!("{}.down", name));
    if period == 0 {
        return up;
    }

    let n = period as f64;
    for i in period..m.len() {
        let start = i - period;
        if let Some(high_at) = m.find_max_index_between(HIGH, start, period + 1) {
            m.set(i, up, 100.0 * (n - (i - high_at) as f64) / n);
        }
        if let Some(low_at) = m.find_min_index_between(LOW, start, period + 1) {
            m.set(i, down, 100.0 * (n - (i - low_at) as f64) / n);
        }
    }
    up
}
