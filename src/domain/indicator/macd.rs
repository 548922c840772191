//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Diff = MACD Line - Signal Line
//!
//! Result columns: line (returned), signal (+1), diff (+2).
//! Default parameters: fast=12, slow=26, signal=9

use crate::domain::column::Column;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::moving_average::ema;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::CLOSE;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn macd(m: &mut Matrix, fast: usize, slow: usize, signal_period: usize) -> Column {
    let name = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    }
    .to_string();
    let line = m.add_named_column(name.clone());
    let signal = m.add_named_column(format!("{}.signal", name));
    let diff = m.add_named_column(format!("{}.diff", name));

    let mut scope = m.scope();
    let ema_fast = scope.call(|m| ema(m, fast, CLOSE));
    let ema_slow = scope.call(|m| ema(m, slow, CLOSE));
    for i in 0..scope.len() {
        let value = scope.get(i, ema_fast) - scope.get(i, ema_slow);
        scope.set(i, line, value);
    }

    let smoothed = scope.call(|m| ema(m, signal_period, line));
    for i in 0..scope.len() {
        let s = scope.get(i, smoothed);
        scope.set(i, signal, s);
        scope.set(i, diff, scope.get(i, line) - s);
    }
    line
}

pub fn macd_default(m: &mut Matrix) -> Column {
    macd(m, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
