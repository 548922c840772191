//! Property tests for the column engine, moving averages and swing detector.

mod common;

use barmatrix::domain::indicator::moving_average::{ema, rma, sma};
use barmatrix::domain::indicator::rsi::rsi;
use barmatrix::domain::matrix::Matrix;
use barmatrix::domain::ohlcv::{HIGH, LOW};
use barmatrix::domain::swing::{self, SwingBase};
use common::*;
use proptest::prelude::*;

fn prices(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, min_len..60)
}

fn close_to(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #[test]
    fn add_row_keeps_latest_values(
        keys in prop::collection::vec(0i64..20, 1..40),
        values in prop::collection::vec(-100.0f64..100.0, 40),
    ) {
        let mut m = Matrix::new(1);
        let mut latest = std::collections::HashMap::new();
        for (key, value) in keys.iter().zip(&values) {
            m.add_row(*key).set(0, *value);
            latest.insert(*key, *value);
        }
        prop_assert_eq!(m.len(), latest.len());
        for (key, value) in latest {
            prop_assert_eq!(m.row_by_key(key).unwrap().get(0), value);
        }
    }

    #[test]
    fn add_then_remove_column_restores_shape(values in prices(0), extra in 0usize..4) {
        let mut m = series(&values);
        for _ in 0..extra {
            m.add_column();
        }
        let cols = m.cols();
        let before: Vec<Vec<f64>> = m.rows().iter().map(|r| r.values().to_vec()).collect();
        m.add_column();
        m.remove_column();
        prop_assert_eq!(m.cols(), cols);
        let after: Vec<Vec<f64>> = m.rows().iter().map(|r| r.values().to_vec()).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn sma_is_trailing_mean(values in prices(1), period in 1usize..10) {
        let mut m = series(&values);
        let s = sma(&mut m, period, 0);
        for i in 0..values.len() {
            if i + 1 >= period {
                let mean = values[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
                prop_assert!(close_to(m.get(i, s), mean), "row {}: {} vs {}", i, m.get(i, s), mean);
            } else {
                prop_assert_eq!(m.get(i, s), 0.0);
            }
        }
    }

    #[test]
    fn ema_follows_recurrence(values in prices(2), period in 1usize..10) {
        prop_assume!(values.len() > period);
        let mut m = series(&values);
        let e = ema(&mut m, period, 0);
        let s = sma(&mut m, period, 0);
        let k = 2.0 / (period as f64 + 1.0);
        prop_assert!(close_to(m.get(period, e), m.get(period - 1, s)));
        for i in period + 1..values.len() {
            let expected = m.get(i - 1, e) * (1.0 - k) + values[i] * k;
            prop_assert!(close_to(m.get(i, e), expected));
        }
        for i in 0..period {
            prop_assert_eq!(m.get(i, e), 0.0);
        }
    }

    #[test]
    fn rma_follows_recurrence(values in prices(1), period in 1usize..10) {
        prop_assume!(values.len() >= period);
        let mut m = series(&values);
        let r = rma(&mut m, period, 0);
        let n = period as f64;
        let seed = values[..period].iter().sum::<f64>() / n;
        prop_assert!(close_to(m.get(period - 1, r), seed));
        for i in period..values.len() {
            let expected = (m.get(i - 1, r) * (n - 1.0) + values[i]) / n;
            prop_assert!(close_to(m.get(i, r), expected));
        }
    }

    #[test]
    fn rsi_is_bounded(values in prices(2), period in 1usize..15) {
        let mut m = series(&values);
        let r = rsi(&mut m, period, 0);
        for v in m.column_values(r) {
            prop_assert!(v.is_finite());
            prop_assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn windowed_extremes_match_brute_force(
        values in prices(0),
        start in 0usize..70,
        count in 0usize..70,
    ) {
        let m = series(&values);
        let end = (start + count).min(values.len());
        let window: Vec<f64> = if start < end { values[start..end].to_vec() } else { vec![] };
        let (lo, hi) = m.find_min_max_between(0, start, count);
        if window.is_empty() {
            prop_assert_eq!((lo, hi), (0.0, 0.0));
        } else {
            let min = window.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(lo, min);
            prop_assert_eq!(hi, max);
            prop_assert_eq!(m.find_min_between(0, start, count), min);
            prop_assert_eq!(m.find_max_between(0, start, count), max);
            prop_assert!(close_to(m.partial_sum(0, start, count), window.iter().sum()));
        }
    }

    #[test]
    fn swing_points_are_strict_and_broken_flags_exact(
        highs in prop::collection::vec(1.0f64..50.0, 0..50),
    ) {
        let lows: Vec<f64> = highs.iter().map(|h| h - 0.5).collect();
        let m = high_low_matrix(&highs, &lows);
        let points = swing::find_swing_points(&m);
        if highs.len() < 5 {
            prop_assert!(points.is_empty());
        }
        for p in &points {
            let i = p.index;
            prop_assert!(i >= 2 && i + 2 < m.len());
            let (field, later_breach) = match p.base_type {
                SwingBase::High => {
                    for j in [i - 2, i - 1, i + 1, i + 2] {
                        prop_assert!(m.get(i, HIGH) > m.get(j, HIGH));
                    }
                    (HIGH, (i + 1..m.len()).any(|j| m.get(j, HIGH) > p.value))
                }
                SwingBase::Low => {
                    for j in [i - 2, i - 1, i + 1, i + 2] {
                        prop_assert!(m.get(i, LOW) < m.get(j, LOW));
                    }
                    (LOW, (i + 1..m.len()).any(|j| m.get(j, LOW) < p.value))
                }
            };
            prop_assert_eq!(p.value, m.get(i, field));
            prop_assert_eq!(p.broken, later_breach);
        }
        for pair in points.windows(2) {
            prop_assert!(pair[0].index <= pair[1].index);
            prop_assert!(close_to(pair[1].delta, pair[1].value - pair[0].value));
        }
    }
}
