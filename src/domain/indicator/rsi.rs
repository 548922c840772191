//! RSI (Relative Strength Index).
//!
//! Per-bar change of the field is split into up-moves and down-moves (down
//! stored as a positive magnitude); each is Wilder-smoothed over n.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_up / avg_down))
//! If avg_down == 0 and avg_up > 0: RSI = 100. If both are 0 the row keeps
//! the zero default, which also covers the warm-up rows before n-1.

use crate::domain::column::{AsField, Column};
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::moving_average::rma;
use crate::domain::matrix::Matrix;

pub fn rsi(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Rsi { period, field }.to_string());
    if period == 0 {
        return out;
    }

    let mut scope = m.scope();
    let up = scope.temp();
    let down = scope.temp();
    for i in 1..scope.len() {
        let change = scope.get(i, field) - scope.get(i - 1, field);
        if change > 0.0 {
            scope.set(i, up, change);
        } else if change < 0.0 {
            scope.set(i, down, -change);
        }
    }

    let avg_up = scope.call(|m| rma(m, period, up.index()));
    let avg_down = scope.call(|m| rma(m, period, down.index()));
    for i in 0..scope.len() {
        let gain = scope.get(i, avg_up);
        let loss = scope.get(i, avg_down);
        let value = if loss != 0.0 {
            100.0 - 100.0 / (1.0 + gain / loss)
        } else if gain > 0.0 {
            100.0
        } else {
            continue;
        };
        scope.set(i, out, value);
    }
    out
}
