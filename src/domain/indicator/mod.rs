//! Technical indicators computed as columns of a [`Matrix`].
//!
//! Every indicator is a function `(&mut Matrix, params...) -> Column`. It
//! appends its result columns (primary first, ancillary columns at the
//! following handles), then opens a [`ColumnScope`](crate::domain::column::ColumnScope)
//! for scratch work, so the caller's layout grows by exactly
//! [`IndicatorType::outputs`] columns.
//!
//! [`IndicatorType`] names an indicator together with its parameters. Its
//! `Display` form doubles as the column header (`SMA(20)`, `MACD(12,26,9)`).

pub mod adx;
pub mod aroon;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod macd;
pub mod moving_average;
pub mod obv;
pub mod roc;
pub mod rsi;
pub mod stochastic;

use std::fmt;

use crate::domain::column::Column;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{CLOSE, field_name};
use crate::domain::window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma { period: usize, field: usize },
    Ema { period: usize, field: usize },
    Rma { period: usize, field: usize },
    Wma { period: usize, field: usize },
    Dema { period: usize, field: usize },
    Tema { period: usize, field: usize },
    Hma { period: usize, field: usize },
    Highest { period: usize, field: usize },
    Lowest { period: usize, field: usize },
    Sum { period: usize, field: usize },
    StdDev { period: usize, field: usize },
    Quantile { period: usize, field: usize, pct: u32 },
    Rsi { period: usize, field: usize },
    Momentum { period: usize, field: usize },
    Roc { period: usize, field: usize },
    Macd { fast: usize, slow: usize, signal: usize },
    TrueRange,
    Atr(usize),
    Adx(usize),
    Bollinger {
        period: usize,
        upper_x100: u32,
        lower_x100: u32,
    },
    StochasticFast(usize),
    Stochastic {
        period: usize,
        k_smooth: usize,
        d_smooth: usize,
    },
    StochRsi {
        rsi_period: usize,
        period: usize,
        k_smooth: usize,
        d_smooth: usize,
    },
    WilliamsR(usize),
    Cci(usize),
    Aroon(usize),
    Obv,
}

impl IndicatorType {
    /// Number of result columns the indicator leaves behind.
    pub fn outputs(&self) -> usize {
        match self {
            IndicatorType::Macd { .. } | IndicatorType::Adx(_) | IndicatorType::Bollinger { .. } => 3,
            IndicatorType::Atr(_)
            | IndicatorType::Stochastic { .. }
            | IndicatorType::StochRsi { .. }
            | IndicatorType::Aroon(_) => 2,
            _ => 1,
        }
    }

    /// Computes the indicator into `m` and returns its primary column.
    pub fn apply(&self, m: &mut Matrix) -> Column {
        match *self {
            IndicatorType::Sma { period, field } => moving_average::sma(m, period, field),
            IndicatorType::Ema { period, field } => moving_average::ema(m, period, field),
            IndicatorType::Rma { period, field } => moving_average::rma(m, period, field),
            IndicatorType::Wma { period, field } => moving_average::wma(m, period, field),
            IndicatorType::Dema { period, field } => moving_average::dema(m, period, field),
            IndicatorType::Tema { period, field } => moving_average::tema(m, period, field),
            IndicatorType::Hma { period, field } => moving_average::hma(m, period, field),
            IndicatorType::Highest { period, field } => window::highest(m, period, field),
            IndicatorType::Lowest { period, field } => window::lowest(m, period, field),
            IndicatorType::Sum { period, field } => window::rolling_sum(m, period, field),
            IndicatorType::StdDev { period, field } => window::std_dev(m, period, field),
            IndicatorType::Quantile { period, field, pct } => {
                window::quantile(m, period, field, pct as f64 / 100.0)
            }
            IndicatorType::Rsi { period, field } => rsi::rsi(m, period, field),
            IndicatorType::Momentum { period, field } => roc::momentum(m, period, field),
            IndicatorType::Roc { period, field } => roc::roc(m, period, field),
            IndicatorType::Macd { fast, slow, signal } => macd::macd(m, fast, slow, signal),
            IndicatorType::TrueRange => atr::true_range(m),
            IndicatorType::Atr(period) => atr::atr(m, period),
            IndicatorType::Adx(period) => adx::adx(m, period),
            IndicatorType::Bollinger {
                period,
                upper_x100,
                lower_x100,
            } => bollinger::bollinger(
                m,
                period,
                upper_x100 as f64 / 100.0,
                lower_x100 as f64 / 100.0,
            ),
            IndicatorType::StochasticFast(period) => stochastic::stochastic_fast(m, period),
            IndicatorType::Stochastic {
                period,
                k_smooth,
                d_smooth,
            } => stochastic::stochastic(m, period, k_smooth, d_smooth),
            IndicatorType::StochRsi {
                rsi_period,
                period,
                k_smooth,
                d_smooth,
            } => stochastic::stoch_rsi(m, rsi_period, period, k_smooth, d_smooth),
            IndicatorType::WilliamsR(period) => stochastic::williams_r(m, period),
            IndicatorType::Cci(period) => cci::cci(m, period),
            IndicatorType::Aroon(period) => aroon::aroon(m, period),
            IndicatorType::Obv => obv::obv(m),
        }
    }
}

/// `NAME(period)` for the close field, `NAME(period,field)` otherwise.
fn write_with_field(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    period: usize,
    field: usize,
) -> fmt::Result {
    if field == CLOSE {
        write!(f, "{}({})", name, period)
    } else {
        write!(f, "{}({},{})", name, period, field_name(field))
    }
}

fn fmt_mult(x100: u32) -> f64 {
    x100 as f64 / 100.0
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            IndicatorType::Sma { period, field } => write_with_field(f, "SMA", period, field),
            IndicatorType::Ema { period, field } => write_with_field(f, "EMA", period, field),
            IndicatorType::Rma { period, field } => write_with_field(f, "RMA", period, field),
            IndicatorType::Wma { period, field } => write_with_field(f, "WMA", period, field),
            IndicatorType::Dema { period, field } => write_with_field(f, "DEMA", period, field),
            IndicatorType::Tema { period, field } => write_with_field(f, "TEMA", period, field),
            IndicatorType::Hma { period, field } => write_with_field(f, "HMA", period, field),
            IndicatorType::Highest { period, field } => {
                write_with_field(f, "HIGHEST", period, field)
            }
            IndicatorType::Lowest { period, field } => write_with_field(f, "LOWEST", period, field),
            IndicatorType::Sum { period, field } => write_with_field(f, "SUM", period, field),
            IndicatorType::StdDev { period, field } => {
                write_with_field(f, "STDDEV", period, field)
            }
            IndicatorType::Quantile { period, field, pct } => {
                write!(f, "QUANTILE({},{}", period, fmt_mult(pct))?;
                if field != CLOSE {
                    write!(f, ",{}", field_name(field))?;
                }
                write!(f, ")")
            }
            IndicatorType::Rsi { period, field } => write_with_field(f, "RSI", period, field),
            IndicatorType::Momentum { period, field } => write_with_field(f, "MOM", period, field),
            IndicatorType::Roc { period, field } => write_with_field(f, "ROC", period, field),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::TrueRange => write!(f, "TR"),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Bollinger {
                period,
                upper_x100,
                lower_x100,
            } => {
                if upper_x100 == lower_x100 {
                    write!(f, "BB({},{})", period, fmt_mult(upper_x100))
                } else {
                    write!(
                        f,
                        "BB({},{},{})",
                        period,
                        fmt_mult(upper_x100),
                        fmt_mult(lower_x100)
                    )
                }
            }
            IndicatorType::StochasticFast(period) => write!(f, "STOCHF({})", period),
            IndicatorType::Stochastic {
                period,
                k_smooth,
                d_smooth,
            } => write!(f, "STOCH({},{},{})", period, k_smooth, d_smooth),
            IndicatorType::StochRsi {
                rsi_period,
                period,
                k_smooth,
                d_smooth,
            } => write!(
                f,
                "STOCHRSI({},{},{},{})",
                rsi_period, period, k_smooth, d_smooth
            ),
            IndicatorType::WilliamsR(period) => write!(f, "WILLR({})", period),
            IndicatorType::Cci(period) => write!(f, "CCI({})", period),
            IndicatorType::Aroon(period) => write!(f, "AROON({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
        }
    }
}
