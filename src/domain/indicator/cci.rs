//! CCI (Commodity Channel Index).
//!
//! TP = (high + low + close) / 3
//! CCI(n) = (TP - SMA(n) of TP) / (0.015 * mean absolute deviation of TP)
//! A zero mean deviation leaves the zero default. Warmup: first n-1 rows.

use crate::domain::column::Column;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::moving_average::sma;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{CLOSE, HIGH, LOW};

const LAMBERT: f64 = 0.015;

pub fn cci(m: &mut Matrix, period: usize) -> Column {
    let out = m.add_named_column(IndicatorType::Cci(period).to_string());
    if period == 0 || m.len() < period {
        return out;
    }

    let mut scope = m.scope();
    let typical = scope.temp();
    for i in 0..scope.len() {
        let tp = (scope.get(i, HIGH) + scope.get(i, LOW) + scope.get(i, CLOSE)) / 3.0;
        scope.set(i, typical, tp);
    }

    let mean = scope.call(|m| sma(m, period, typical.index()));
    for i in period - 1..scope.len() {
        let mu = scope.get(i, mean);
        let deviation = (i + 1 - period..=i)
            .map(|j| (scope.get(j, typical) - mu).abs())
            .sum::<f64>()
            / period as f64;
        if deviation != 0.0 {
            let value = (scope.get(i, typical) - mu) / (LAMBERT * deviation);
            scope.set(i, out, value);
        }
    }
    out
}
