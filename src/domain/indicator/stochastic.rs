//! Stochastic oscillator family and Williams %R.
//!
//! raw %K = (value - lowest_low(n)) / (highest_high(n) - lowest_low(n)) * 100
//! K = SMA(k_smooth) of raw %K, D = SMA(d_smooth) of K.
//!
//! Raw values start once the look-back window is full (row n-1). When the
//! window has no range (highest == lowest) the row keeps the zero default.

use crate::domain::column::{AsField, Column, ColumnScope};
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::moving_average::sma;
use crate::domain::indicator::rsi::rsi;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{CLOSE, HIGH, LOW};

/// Writes raw %K of `value` against the `high`/`low` fields into `out`.
fn fill_raw(
    m: &mut Matrix,
    period: usize,
    value: impl AsField,
    high: impl AsField,
    low: impl AsField,
    out: impl AsField,
) {
    if period == 0 {
        return;
    }
    for i in period.saturating_sub(1)..m.len() {
        let start = i + 1 - period;
        let highest = m.find_max_between(high, start, period);
        let lowest = m.find_min_between(low, start, period);
        let range = highest - lowest;
        if range != 0.0 {
            let raw = (m.get(i, value) - lowest) / range * 100.0;
            m.set(i, out, raw);
        }
    }
}

/// Smooths `raw` into K and K into D. Scratch columns belong to `scope`.
fn smooth_kd(
    scope: &mut ColumnScope<'_>,
    raw: impl AsField,
    k_smooth: usize,
    d_smooth: usize,
    k: Column,
    d: Column,
) {
    let k_values = scope.call(|m| sma(m, k_smooth, raw));
    scope.copy(k_values, k);
    let d_values = scope.call(|m| sma(m, d_smooth, k));
    scope.copy(d_values, d);
}

/// Fast (unsmoothed) stochastic %K of close.
pub fn stochastic_fast(m: &mut Matrix, period: usize) -> Column {
    let out = m.add_named_column(IndicatorType::StochasticFast(period).to_string());
    fill_raw(m, period, CLOSE, HIGH, LOW, out);
    out
}

/// Result columns: K (returned), D (+1).
pub fn stochastic(m: &mut Matrix, period: usize, k_smooth: usize, d_smooth: usize) -> Column {
    let name = IndicatorType::Stochastic {
        period,
        k_smooth,
        d_smooth,
    }
    .to_string();
    let k = m.add_named_column(name.clone());
    let d = m.add_named_column(format!("{}.D", name));

    let mut scope = m.scope();
    let raw = scope.call(|m| stochastic_fast(m, period));
    smooth_kd(&mut scope, raw, k_smooth, d_smooth, k, d);
    k
}

/// Stochastic oscillator applied to an RSI column.
/// Result columns: K (returned), D (+1).
pub fn stoch_rsi(
    m: &mut Matrix,
    rsi_period: usize,
    period: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> Column {
    let name = IndicatorType::StochRsi {
        rsi_period,
        period,
        k_smooth,
        d_smooth,
    }
    .to_string();
    let k = m.add_named_column(name.clone());
    let d = m.add_named_column(format!("{}.D", name));

    let mut scope = m.scope();
    let strength = scope.call(|m| rsi(m, rsi_period, CLOSE));
    let raw = scope.call(|m| {
        let out = m.add_column();
        fill_raw(m, period, strength, strength, strength, out);
        out
    });
    smooth_kd(&mut scope, raw, k_smooth, d_smooth, k, d);
    k
}

/// Williams %R: -100 * (highest_high - close) / (highest_high - lowest_low).
pub fn williams_r(m: &mut Matrix, period: usize) -> Column {
    let out = m.add_named_column(IndicatorType::WilliamsR(period).to_string());
    if period == 0 {
        return out;
    }
    for i in period.saturating_sub(1)..m.len() {
        let start = i + 1 - period;
        let highest = m.find_max_between(HIGH, start, period);
        let lowest = m.find_min_between(LOW, start, period);
        let range = highest - lowest;
        if range != 0.0 {
            let value = -100.0 * (highest - m.get(i, CLOSE)) / range;
            m.set(i, out, value);
        }
    }
    out
}
