//! Rolling-window primitives over a single field.
//!
//! `highest` and `lowest` look back over a clamped window and are defined
//! from the first row. `rolling_sum`, `std_dev` and `quantile` need a full
//! window; earlier rows keep the zero default. A period of zero leaves the
//! result column at zero.

use crate::domain::column::{AsField, Column};
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::moving_average::sma;
use crate::domain::matrix::Matrix;

/// Clamped trailing window ending at row `i`: (start, count).
pub(crate) fn lookback(i: usize, period: usize) -> (usize, usize) {
    let start = (i + 1).saturating_sub(period);
    (start, i + 1 - start)
}

/// Highest value of `field` over the last `period` rows.
pub fn highest(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Highest { period, field }.to_string());
    if period == 0 {
        return out;
    }
    for i in 0..m.len() {
        let (start, count) = lookback(i, period);
        let value = m.find_max_between(field, start, count);
        m.set(i, out, value);
    }
    out
}

/// Lowest value of `field` over the last `period` rows.
pub fn lowest(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Lowest { period, field }.to_string());
    if period == 0 {
        return out;
    }
    for i in 0..m.len() {
        let (start, count) = lookback(i, period);
        let value = m.find_min_between(field, start, count);
        m.set(i, out, value);
    }
    out
}

/// Sum of the last `period` values of `field`, from row `period - 1` on.
pub fn rolling_sum(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Sum { period, field }.to_string());
    if period == 0 {
        return out;
    }
    for i in period.saturating_sub(1)..m.len() {
        let value = m.partial_sum(field, i + 1 - period, period);
        m.set(i, out, value);
    }
    out
}

/// Population standard deviation of the last `period` values of `field`
/// around the matching SMA.
pub fn std_dev(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::StdDev { period, field }.to_string());
    if period == 0 || m.len() < period {
        return out;
    }

    let mut scope = m.scope();
    let mean = scope.call(|m| sma(m, period, field));
    for i in period - 1..scope.len() {
        let mu = scope.get(i, mean);
        let variance = (i + 1 - period..=i)
            .map(|j| {
                let diff = scope.get(j, field) - mu;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        scope.set(i, out, variance.sqrt());
    }
    out
}

/// Rolling quantile `q` (clamped to `[0, 1]`) of the last `period` values,
/// interpolating linearly between the two closest ranks.
pub fn quantile(m: &mut Matrix, period: usize, field: impl AsField, q: f64) -> Column {
    let field = field.field();
    let q = q.clamp(0.0, 1.0);
    let out = m.add_named_column(
        IndicatorType::Quantile {
            period,
            field,
            pct: (q * 100.0).round() as u32,
        }
        .to_string(),
    );
    if period == 0 || m.len() < period {
        return out;
    }

    let mut window = Vec::with_capacity(period);
    for i in period.saturating_sub(1)..m.len() {
        window.clear();
        window.extend((i + 1 - period..=i).map(|j| m.get(j, field)));
        window.sort_by(f64::total_cmp);

        let rank = q * (period - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        let value = window[lo] + (window[hi] - window[lo]) * (rank - lo as f64);
        m.set(i, out, value);
    }
    out
}
