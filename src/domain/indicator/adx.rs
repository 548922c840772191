//! ADX (Average Directional Index) with +DI and -DI.
//!
//! Calculation pipeline:
//!   1. +DM = high - prev_high when it exceeds prev_low - low and is positive,
//!      -DM symmetrically; both 0 on the first row.
//!   2. Wilder-smooth +DM, -DM and TR over n.
//!   3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise.
//!   4. DX = 100 * |+DI - -DI| / (+DI + -DI).
//!   5. ADX = Wilder smoothing of DX over n.
//!
//! Result columns: ADX (returned), +DI (+1), -DI (+2). Zero denominators
//! leave the zero default.

use crate::domain::column::Column;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::atr::true_range;
use crate::domain::indicator::moving_average::rma;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{HIGH, LOW};

pub fn adx(m: &mut Matrix, period: usize) -> Column {
    let name = IndicatorType::Adx(period).to_string();
    let out = m.add_named_column(name.clone());
    let plus_di = m.add_named_column(format!("{}.+DI", name));
    let minus_di = m.add_named_column(format!("{}.-DI", name));

    let mut scope = m.scope();
    let plus_dm = scope.temp();
    let minus_dm = scope.temp();
    for i in 1..scope.len() {
        let up = scope.get(i, HIGH) - scope.get(i - 1, HIGH);
        let down = scope.get(i - 1, LOW) - scope.get(i, LOW);
        if up > down && up > 0.0 {
            scope.set(i, plus_dm, up);
        }
        if down > up && down > 0.0 {
            scope.set(i, minus_dm, down);
        }
    }

    let tr = scope.call(true_range);
    let smooth_tr = scope.call(|m| rma(m, period, tr.index()));
    let smooth_plus = scope.call(|m| rma(m, period, plus_dm.index()));
    let smooth_minus = scope.call(|m| rma(m, period, minus_dm.index()));

    let dx = scope.temp();
    for i in 0..scope.len() {
        let range = scope.get(i, smooth_tr);
        if range == 0.0 {
            continue;
        }
        let pdi = 100.0 * scope.get(i, smooth_plus) / range;
        let mdi = 100.0 * scope.get(i, smooth_minus) / range;
        scope.set(i, plus_di, pdi);
        scope.set(i, minus_di, mdi);
        if pdi + mdi != 0.0 {
            scope.set(i, dx, 100.0 * (pdi - mdi).abs() / (pdi + mdi));
        }
    }

    let smoothed_dx = scope.call(|m| rma(m, period, dx.index()));
    scope.copy(smoothed_dx, out);
    out
}
