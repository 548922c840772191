//! Swing-point (fractal) detection over the high and low columns.
//!
//! A bar is a swing High when its high is strictly above the high of every
//! bar within `size` rows on either side, and a swing Low when its low is
//! strictly below every neighbouring low. Detection runs in two passes: a
//! forward scan that finds and classifies extremes, then a pass that fills
//! in deltas and marks extremes broken by any later bar.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::domain::column::AsField;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{CLOSE, HIGH, LOW};

/// Half-window used by [`find_swing_points`].
pub const DEFAULT_SWING_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwingBase {
    High,
    Low,
}

impl fmt::Display for SwingBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwingBase::High => write!(f, "High"),
            SwingBase::Low => write!(f, "Low"),
        }
    }
}

/// Trend classification of an extreme relative to the previous one on the
/// same side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwingKind {
    HigherHigh,
    LowerHigh,
    HigherLow,
    LowerLow,
}

const KIND_TABLE: [(SwingKind, &str, u8); 4] = [
    (SwingKind::HigherHigh, "HH", 1),
    (SwingKind::LowerHigh, "LH", 2),
    (SwingKind::HigherLow, "HL", 3),
    (SwingKind::LowerLow, "LL", 4),
];

impl SwingKind {
    /// Short label: `HH`, `LH`, `HL` or `LL`.
    pub fn name(self) -> &'static str {
        KIND_TABLE
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("")
    }

    /// Stable numeric code for serialized output.
    pub fn code(self) -> u8 {
        KIND_TABLE
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, _, code)| *code)
            .unwrap_or(0)
    }

    pub fn from_code(code: u8) -> Option<Self> {
        KIND_TABLE
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(kind, _, _)| *kind)
    }

    pub fn base(self) -> SwingBase {
        match self {
            SwingKind::HigherHigh | SwingKind::LowerHigh => SwingBase::High,
            SwingKind::HigherLow | SwingKind::LowerLow => SwingBase::Low,
        }
    }
}

impl fmt::Display for SwingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SwingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        KIND_TABLE
            .iter()
            .find(|(_, name, _)| *name == upper)
            .map(|(kind, _, _)| *kind)
            .ok_or_else(|| format!("unknown swing kind: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwingPoint {
    pub timestamp: i64,
    pub base_type: SwingBase,
    pub kind: SwingKind,
    /// The extreme itself (high for a High, low for a Low).
    pub value: f64,
    /// Close of the extreme bar.
    pub price: f64,
    pub index: usize,
    /// Change from the previous point of the combined sequence.
    pub delta: f64,
    pub broken: bool,
}

/// Swing points with the default half-window of two bars.
pub fn find_swing_points(m: &Matrix) -> Vec<SwingPoint> {
    fractals(m, DEFAULT_SWING_SIZE)
}

/// Swing points over the high and low columns with half-window `size`.
pub fn fractals(m: &Matrix, size: usize) -> Vec<SwingPoint> {
    detect(m, size, HIGH, LOW)
}

/// Swing points over a single field, used for both highs and lows.
pub fn find_swing_points_by_field(m: &Matrix, field: impl AsField, size: usize) -> Vec<SwingPoint> {
    let field = field.field();
    detect(m, size, field, field)
}

fn detect(m: &Matrix, size: usize, high: usize, low: usize) -> Vec<SwingPoint> {
    let size = size.max(1);
    let span = size.checked_mul(2).and_then(|s| s.checked_add(1));
    if span.is_none_or(|span| m.len() < span) {
        debug!(rows = m.len(), size, "too few rows for swing detection");
        return Vec::new();
    }

    let mut points = scan_extremes(m, size, high, low);
    fill_deltas(&mut points);
    mark_broken(m, &mut points, high, low);
    debug!(count = points.len(), size, "swing points detected");
    points
}

fn is_extreme(m: &Matrix, i: usize, size: usize, field: usize, beats: fn(f64, f64) -> bool) -> bool {
    let value = m.get(i, field);
    (i - size..=i + size)
        .filter(|&j| j != i)
        .all(|j| beats(value, m.get(j, field)))
}

fn scan_extremes(m: &Matrix, size: usize, high: usize, low: usize) -> Vec<SwingPoint> {
    let mut points = Vec::new();
    let mut last_high: Option<f64> = None;
    let mut last_low: Option<f64> = None;

    for i in size..m.len() - size {
        let timestamp = m.row(i).map(|r| r.key()).unwrap_or_default();
        let price = m.get(i, CLOSE);

        if is_extreme(m, i, size, high, |a, b| a > b) {
            let value = m.get(i, high);
            let kind = match last_high {
                Some(prev) if value <= prev => SwingKind::LowerHigh,
                _ => SwingKind::HigherHigh,
            };
            last_high = Some(value);
            trace!(index = i, value, %kind, "swing high");
            points.push(SwingPoint {
                timestamp,
                base_type: SwingBase::High,
                kind,
                value,
                price,
                index: i,
                delta: 0.0,
                broken: false,
            });
        }

        if is_extreme(m, i, size, low, |a, b| a < b) {
            let value = m.get(i, low);
            let kind = match last_low {
                Some(prev) if value > prev => SwingKind::HigherLow,
                _ => SwingKind::LowerLow,
            };
            last_low = Some(value);
            trace!(index = i, value, %kind, "swing low");
            points.push(SwingPoint {
                timestamp,
                base_type: SwingBase::Low,
                kind,
                value,
                price,
                index: i,
                delta: 0.0,
                broken: false,
            });
        }
    }
    points
}

fn fill_deltas(points: &mut [SwingPoint]) {
    for i in 1..points.len() {
        points[i].delta = points[i].value - points[i - 1].value;
    }
}

fn mark_broken(m: &Matrix, points: &mut [SwingPoint], high: usize, low: usize) {
    for point in points.iter_mut() {
        let mut later = point.index + 1..m.len();
        point.broken = match point.base_type {
            SwingBase::High => later.any(|j| m.get(j, high) > point.value),
            SwingBase::Low => later.any(|j| m.get(j, low) < point.value),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(highs: &[f64], lows: &[f64]) -> Matrix {
        let mut m = Matrix::new(6);
        for (i, (&h, &l)) in highs.iter().zip(lows).enumerate() {
            m.add_row(100 + i as i64)
                .set(HIGH, h)
                .set(LOW, l)
                .set(CLOSE, (h + l) / 2.0);
        }
        m
    }

    #[test]
    fn too_few_rows_yield_nothing() {
        let m = bars(&[1.0, 5.0, 1.0, 1.0], &[0.5; 4]);
        assert!(find_swing_points(&m).is_empty());
    }

    #[test]
    fn huge_window_yields_nothing() {
        let m = bars(&[1.0, 2.0, 5.0, 2.0, 1.0], &[0.5, 0.6, 0.7, 0.6, 0.5]);
        assert!(fractals(&m, usize::MAX).is_empty());
        assert!(fractals(&m, usize::MAX / 2).is_empty());
        assert!(find_swing_points_by_field(&m, HIGH, usize::MAX).is_empty());
    }

    #[test]
    fn single_peak_is_a_higher_high() {
        let m = bars(&[1.0, 2.0, 5.0, 2.0, 1.0], &[0.5, 0.6, 0.7, 0.6, 0.5]);
        let points = find_swing_points(&m);
        assert_eq!(points.len(), 1);
        let p = &points[0];
        assert_eq!(p.base_type, SwingBase::High);
        assert_eq!(p.kind, SwingKind::HigherHigh);
        assert_eq!(p.index, 2);
        assert_eq!(p.timestamp, 102);
        assert_eq!(p.value, 5.0);
        assert_eq!(p.price, (5.0 + 0.7) / 2.0);
        assert_eq!(p.delta, 0.0);
        assert!(!p.broken);
    }

    #[test]
    fn equal_neighbour_is_not_an_extreme() {
        let m = bars(&[1.0, 5.0, 5.0, 2.0, 1.0], &[0.5; 5]);
        assert!(find_swing_points(&m).iter().all(|p| p.base_type != SwingBase::High));
    }

    #[test]
    fn classification_and_broken_flags() {
        let highs = [1.0, 2.0, 8.0, 2.0, 1.0, 2.0, 6.0, 2.0, 1.0, 2.0, 9.0, 2.0, 1.0];
        let lows = [0.5; 13];
        let m = bars(&highs, &lows);
        let points = find_swing_points(&m);
        let highs: Vec<&SwingPoint> = points
            .iter()
            .filter(|p| p.base_type == SwingBase::High)
            .collect();
        assert_eq!(highs.len(), 3);
        assert_eq!(highs[0].kind, SwingKind::HigherHigh);
        assert_eq!(highs[1].kind, SwingKind::LowerHigh);
        assert_eq!(highs[2].kind, SwingKind::HigherHigh);
        // 8 and 6 are both exceeded by the later 9.
        assert!(highs[0].broken);
        assert!(highs[1].broken);
        assert!(!highs[2].broken);
    }

    #[test]
    fn lows_classify_and_deltas_follow_mixed_sequence() {
        let highs = [5.0, 6.0, 9.0, 6.0, 5.0, 4.0, 5.0, 6.0, 5.0];
        let lows = [3.0, 3.0, 4.0, 3.0, 2.0, 1.0, 2.0, 3.0, 3.0];
        let m = bars(&highs, &lows);
        let points = fractals(&m, 2);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].base_type, SwingBase::High);
        assert_eq!(points[1].base_type, SwingBase::Low);
        assert_eq!(points[1].kind, SwingKind::LowerLow);
        assert_eq!(points[1].delta, 1.0 - 9.0);
        assert!(!points[1].broken);
    }

    #[test]
    fn higher_low_after_lower_low() {
        let lows = [5.0, 4.0, 1.0, 4.0, 5.0, 4.0, 3.0, 4.0, 5.0];
        let highs = [6.0; 9];
        let m = bars(&highs, &lows);
        let points = fractals(&m, 2);
        let kinds: Vec<SwingKind> = points.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![SwingKind::LowerLow, SwingKind::HigherLow]);
        assert!(!points[0].broken);
    }

    #[test]
    fn by_field_uses_one_column() {
        let mut m = Matrix::new(6);
        for (i, v) in [1.0, 3.0, 1.0, 3.0, 1.0].into_iter().enumerate() {
            m.add_row(i as i64).set(CLOSE, v);
        }
        let points = find_swing_points_by_field(&m, CLOSE, 1);
        let bases: Vec<SwingBase> = points.iter().map(|p| p.base_type).collect();
        assert_eq!(
            bases,
            vec![SwingBase::High, SwingBase::Low, SwingBase::High]
        );
        assert!(points.iter().all(|p| p.value == p.price));
    }

    #[test]
    fn kind_lookup_round_trips_names_and_codes() {
        for (kind, name, code) in KIND_TABLE {
            assert_eq!(kind.name(), name);
            assert_eq!(kind.code(), code);
            assert_eq!(SwingKind::from_code(code), Some(kind));
            assert_eq!(name.to_lowercase().parse::<SwingKind>(), Ok(kind));
        }
        assert_eq!(SwingKind::from_code(9), None);
        assert!("XX".parse::<SwingKind>().is_err());
        assert_eq!(SwingKind::LowerHigh.base(), SwingBase::High);
    }
}
