//! Bollinger Bands.
//!
//! - Middle: SMA(n) of close
//! - Upper: Middle + (k_upper × StdDev)
//! - Lower: Middle - (k_lower × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Result columns: upper (returned), middle (+1), lower (+2).
//! Warmup: first (period-1) rows are zero.

use crate::domain::column::Column;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::moving_average::sma;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::CLOSE;
use crate::domain::window::std_dev;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub fn bollinger(m: &mut Matrix, period: usize, k_upper: f64, k_lower: f64) -> Column {
    let name = IndicatorType::Bollinger {
        period,
        upper_x100: (k_upper * 100.0).round() as u32,
        lower_x100: (k_lower * 100.0).round() as u32,
    }
    .to_string();
    let upper = m.add_named_column(name.clone());
    let middle = m.add_named_column(format!("{}.mid", name));
    let lower = m.add_named_column(format!("{}.lower", name));
    if period == 0 || m.len() < period {
        return upper;
    }

    let mut scope = m.scope();
    let mean = scope.call(|m| sma(m, period, CLOSE));
    let deviation = scope.call(|m| std_dev(m, period, CLOSE));
    for i in period - 1..scope.len() {
        let mid = scope.get(i, mean);
        let sd = scope.get(i, deviation);
        scope.set(i, upper, mid + k_upper * sd);
        scope.set(i, middle, mid);
        scope.set(i, lower, mid - k_lower * sd);
    }
    upper
}
