//! Moving-average family: SMA, EMA, Wilder's RMA, WMA and the composites
//! built from them (DEMA, TEMA, HMA).
//!
//! Warm-up rows keep the zero default:
//! - SMA(n), WMA(n): defined from row n-1.
//! - RMA(n): seeded at row n-1 with the mean of the first n values,
//!   then RMA[i] = (RMA[i-1]*(n-1) + x[i]) / n.
//! - EMA(n): seeded at row n with SMA(n)[n-1], then
//!   EMA[i] = EMA[i-1]*(1-k) + x[i]*k with k = 2/(n+1).
//!
//! DEMA, TEMA and HMA feed one average into another, so they inherit the
//! zero-padded warm-up of their inner averages.

use crate::domain::column::{AsField, Column};
use crate::domain::indicator::IndicatorType;
use crate::domain::matrix::Matrix;

pub fn sma(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Sma { period, field }.to_string());
    if period == 0 || m.len() < period {
        return out;
    }

    let mut sum = 0.0;
    for i in 0..m.len() {
        sum += m.get(i, field);
        if i >= period {
            sum -= m.get(i - period, field);
        }
        if i + 1 >= period {
            m.set(i, out, sum / period as f64);
        }
    }
    out
}

pub fn ema(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Ema { period, field }.to_string());
    if period == 0 || m.len() <= period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut scope = m.scope();
    let seed = scope.call(|m| sma(m, period, field));

    let mut value = scope.get(period - 1, seed);
    scope.set(period, out, value);
    for i in period + 1..scope.len() {
        value = value * (1.0 - k) + scope.get(i, field) * k;
        scope.set(i, out, value);
    }
    out
}

/// Wilder's smoothing.
pub fn rma(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Rma { period, field }.to_string());
    if period == 0 || m.len() < period {
        return out;
    }

    let n = period as f64;
    let mut value = m.partial_sum(field, 0, period) / n;
    m.set(period - 1, out, value);
    for i in period..m.len() {
        value = (value * (n - 1.0) + m.get(i, field)) / n;
        m.set(i, out, value);
    }
    out
}

/// Linearly weighted average, newest value weighted `period`.
///
/// O(n) sliding window: adding `period * x[i]` and subtracting the plain
/// window sum shifts every weight down by one.
pub fn wma(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Wma { period, field }.to_string());
    if period == 0 || m.len() < period {
        return out;
    }

    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum = 0.0;
    let mut window_sum = 0.0;
    for i in 0..m.len() {
        let x = m.get(i, field);
        if i < period {
            weighted_sum += (i + 1) as f64 * x;
            window_sum += x;
        } else {
            weighted_sum += period as f64 * x - window_sum;
            window_sum += x - m.get(i - period, field);
        }
        if i + 1 >= period {
            m.set(i, out, weighted_sum / divisor);
        }
    }
    out
}

/// 2·EMA − EMA(EMA).
pub fn dema(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Dema { period, field }.to_string());

    let mut scope = m.scope();
    let ema1 = scope.call(|m| ema(m, period, field));
    let ema2 = scope.call(|m| ema(m, period, ema1.index()));
    for i in 0..scope.len() {
        let value = 2.0 * scope.get(i, ema1) - scope.get(i, ema2);
        scope.set(i, out, value);
    }
    out
}

/// 3·EMA1 − 3·EMA2 + EMA3, each EMA taken of the previous one.
pub fn tema(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Tema { period, field }.to_string());

    let mut scope = m.scope();
    let ema1 = scope.call(|m| ema(m, period, field));
    let ema2 = scope.call(|m| ema(m, period, ema1.index()));
    let ema3 = scope.call(|m| ema(m, period, ema2.index()));
    for i in 0..scope.len() {
        let value =
            3.0 * scope.get(i, ema1) - 3.0 * scope.get(i, ema2) + scope.get(i, ema3);
        scope.set(i, out, value);
    }
    out
}

/// Hull moving average: WMA(√n) of 2·WMA(n/2) − WMA(n).
pub fn hma(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Hma { period, field }.to_string());
    if period == 0 {
        return out;
    }

    let half = (period / 2).max(1);
    let root = ((period as f64).sqrt() as usize).max(1);

    let mut scope = m.scope();
    let fast = scope.call(|m| wma(m, half, field));
    let slow = scope.call(|m| wma(m, period, field));
    let raw = scope.temp();
    for i in period - 1..scope.len() {
        let value = 2.0 * scope.get(i, fast) - scope.get(i, slow);
        scope.set(i, raw, value);
    }
    let smoothed = scope.call(|m| wma(m, root, raw.index()));
    scope.copy(smoothed, out);
    out
}
