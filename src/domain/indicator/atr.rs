//! True range and ATR (Average True Range).
//!
//! TR[0] = high - low; afterwards
//! TR[i] = max(high - prev_close, |low - prev_close|, |high - low|).
//! ATR(n) is the Wilder smoothing of TR; an EMA(n) of the ATR is kept in
//! the following column for callers that want the extra-smoothed series.

use crate::domain::column::Column;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::moving_average::{ema, rma};
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{CLOSE, HIGH, LOW};

pub(crate) fn true_range_at(m: &Matrix, i: usize) -> f64 {
    let high = m.get(i, HIGH);
    let low = m.get(i, LOW);
    if i == 0 {
        return high - low;
    }
    let prev_close = m.get(i - 1, CLOSE);
    (high - prev_close)
        .max((low - prev_close).abs())
        .max((high - low).abs())
}

pub fn true_range(m: &mut Matrix) -> Column {
    let out = m.add_named_column(IndicatorType::TrueRange.to_string());
    for i in 0..m.len() {
        let tr = true_range_at(m, i);
        m.set(i, out, tr);
    }
    out
}

/// Result columns: ATR (returned), EMA of ATR (+1).
pub fn atr(m: &mut Matrix, period: usize) -> Column {
    let name = IndicatorType::Atr(period).to_string();
    let out = m.add_named_column(name.clone());
    let smoothed = m.add_named_column(format!("{}.ema", name));

    let mut scope = m.scope();
    let tr = scope.call(true_range);
    let wilder = scope.call(|m| rma(m, period, tr.index()));
    scope.copy(wilder, out);
    let extra = scope.call(|m| ema(m, period, out));
    scope.copy(extra, smoothed);
    out
}
