//! Momentum and ROC (Rate of Change).
//!
//! MOM(n)[i] = X[i] - X[i-n]
//! ROC(n)[i] = ((X[i] - X[i-n]) / X[i-n]) * 100
//! If X[i-n] == 0: ROC keeps the zero default.
//! Warmup: first n rows are zero.

use crate::domain::column::{AsField, Column};
use crate::domain::indicator::IndicatorType;
use crate::domain::matrix::Matrix;

pub fn momentum(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Momentum { period, field }.to_string());
    for i in period..m.len() {
        let change = m.get(i, field) - m.get(i - period, field);
        m.set(i, out, change);
    }
    out
}

pub fn roc(m: &mut Matrix, period: usize, field: impl AsField) -> Column {
    let field = field.field();
    let out = m.add_named_column(IndicatorType::Roc { period, field }.to_string());
    for i in period..m.len() {
        let base = m.get(i - period, field);
        if base != 0.0 {
            let value = (m.get(i, field) - base) / base * 100.0;
            m.set(i, out, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn series(values: &[f64]) -> Matrix {
        let mut m = Matrix::with_headers(["Close"]);
        for (i, &v) in values.iter().enumerate() {
            m.add_row(i as i64).set(0, v);
        }
        m
    }

    #[test]
    fn momentum_is_difference() {
        let mut m = series(&[10.0, 12.0, 15.0, 11.0]);
        let mom = momentum(&mut m, 2, 0);
        assert_eq!(m.column_values(mom), vec![0.0, 0.0, 5.0, -1.0]);
    }

    #[test]
    fn roc_basic_calculation() {
        let mut m = series(&[100.0, 105.0, 110.0]);
        let r = roc(&mut m, 1, 0);
        assert_eq!(m.get(0, r), 0.0);
        assert_abs_diff_eq!(m.get(1, r), 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(m.get(2, r), 5.0 / 105.0 * 100.0, epsilon = 1e-10);
    }

    #[test]
    fn roc_zero_base_is_guarded() {
        let mut m = series(&[0.0, 5.0, 10.0]);
        let r = roc(&mut m, 1, 0);
        assert_eq!(m.get(1, r), 0.0);
        assert_abs_diff_eq!(m.get(2, r), 100.0, epsilon = 1e-10);
    }

    #[test]
    fn roc_period_zero_is_flat() {
        let mut m = series(&[3.0, 4.0]);
        let r = roc(&mut m, 0, 0);
        assert_eq!(m.column_values(r), vec![0.0, 0.0]);
    }
}
