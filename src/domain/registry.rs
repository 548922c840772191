//! Name-keyed indicator dispatch.
//!
//! Turns call expressions such as `SMA(20)`, `SMA(20,high)` or
//! `MACD(12,26,9)` into an [`IndicatorType`] and applies it to a matrix.
//! The table is built once and never mutated afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::domain::column::Column;
use crate::domain::error::{ParseError, RegistryError};
use crate::domain::indicator::{IndicatorType, bollinger, macd};
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{CLOSE, parse_field};

const DEFAULT_K_SMOOTH: usize = 3;
const DEFAULT_D_SMOOTH: usize = 3;

/// A parsed `NAME(arg, ...)` expression. Arguments are kept as text and
/// interpreted by the indicator's builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    pub args: Vec<String>,
}

type Builder = fn(&str, &[String]) -> Result<IndicatorType, RegistryError>;

/// One registered indicator.
#[derive(Clone, Copy)]
pub struct IndicatorSpec {
    pub name: &'static str,
    /// Accepted argument counts, ascending.
    pub arities: &'static [usize],
    pub summary: &'static str,
    build: Builder,
}

impl IndicatorSpec {
    pub fn usage(&self) -> String {
        let counts: Vec<String> = self.arities.iter().map(|n| n.to_string()).collect();
        counts.join(" or ")
    }
}

pub struct IndicatorRegistry {
    specs: Vec<IndicatorSpec>,
    index: HashMap<&'static str, usize>,
}

/// Process-wide standard registry.
pub fn registry() -> &'static IndicatorRegistry {
    static REGISTRY: OnceLock<IndicatorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(IndicatorRegistry::standard)
}

impl IndicatorRegistry {
    pub fn new(specs: Vec<IndicatorSpec>) -> Self {
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();
        Self { specs, index }
    }

    /// Every indicator this crate implements.
    pub fn standard() -> Self {
        Self::new(vec![
            IndicatorSpec {
                name: "SMA",
                arities: &[1, 2],
                summary: "simple moving average (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Sma { period, field })
                },
            },
            IndicatorSpec {
                name: "EMA",
                arities: &[1, 2],
                summary: "exponential moving average (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Ema { period, field })
                },
            },
            IndicatorSpec {
                name: "RMA",
                arities: &[1, 2],
                summary: "Wilder's smoothing (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Rma { period, field })
                },
            },
            IndicatorSpec {
                name: "WMA",
                arities: &[1, 2],
                summary: "linearly weighted moving average (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Wma { period, field })
                },
            },
            IndicatorSpec {
                name: "DEMA",
                arities: &[1, 2],
                summary: "double exponential moving average (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Dema { period, field })
                },
            },
            IndicatorSpec {
                name: "TEMA",
                arities: &[1, 2],
                summary: "triple exponential moving average (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Tema { period, field })
                },
            },
            IndicatorSpec {
                name: "HMA",
                arities: &[1, 2],
                summary: "Hull moving average (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Hma { period, field })
                },
            },
            IndicatorSpec {
                name: "HIGHEST",
                arities: &[1, 2],
                summary: "rolling maximum (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Highest {
                        period,
                        field,
                    })
                },
            },
            IndicatorSpec {
                name: "LOWEST",
                arities: &[1, 2],
                summary: "rolling minimum (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Lowest { period, field })
                },
            },
            IndicatorSpec {
                name: "SUM",
                arities: &[1, 2],
                summary: "rolling sum (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Sum { period, field })
                },
            },
            IndicatorSpec {
                name: "STDDEV",
                arities: &[1, 2],
                summary: "population standard deviation (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::StdDev {
                        period,
                        field,
                    })
                },
            },
            IndicatorSpec {
                name: "QUANTILE",
                arities: &[2, 3],
                summary: "rolling quantile (period,q[,field])",
                build: |name, args| {
                    Ok(IndicatorType::Quantile {
                        period: period(name, &args[0])?,
                        pct: fraction_pct(name, &args[1])?,
                        field: optional_field(name, args.get(2))?,
                    })
                },
            },
            IndicatorSpec {
                name: "RSI",
                arities: &[1, 2],
                summary: "relative strength index (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Rsi { period, field })
                },
            },
            IndicatorSpec {
                name: "MOM",
                arities: &[1, 2],
                summary: "momentum (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Momentum {
                        period,
                        field,
                    })
                },
            },
            IndicatorSpec {
                name: "ROC",
                arities: &[1, 2],
                summary: "rate of change in percent (period[,field])",
                build: |name, args| {
                    period_field(name, args, |period, field| IndicatorType::Roc { period, field })
                },
            },
            IndicatorSpec {
                name: "MACD",
                arities: &[0, 3],
                summary: "MACD line, signal and histogram ([fast,slow,signal])",
                build: |name, args| {
                    if args.is_empty() {
                        return Ok(IndicatorType::Macd {
                            fast: macd::DEFAULT_FAST,
                            slow: macd::DEFAULT_SLOW,
                            signal: macd::DEFAULT_SIGNAL,
                        });
                    }
                    Ok(IndicatorType::Macd {
                        fast: period(name, &args[0])?,
                        slow: period(name, &args[1])?,
                        signal: period(name, &args[2])?,
                    })
                },
            },
            IndicatorSpec {
                name: "TR",
                arities: &[0],
                summary: "true range",
                build: |_, _| Ok(IndicatorType::TrueRange),
            },
            IndicatorSpec {
                name: "ATR",
                arities: &[1],
                summary: "average true range and its EMA (period)",
                build: |name, args| Ok(IndicatorType::Atr(period(name, &args[0])?)),
            },
            IndicatorSpec {
                name: "ADX",
                arities: &[1],
                summary: "average directional index, +DI and -DI (period)",
                build: |name, args| Ok(IndicatorType::Adx(period(name, &args[0])?)),
            },
            IndicatorSpec {
                name: "BB",
                arities: &[1, 2, 3],
                summary: "Bollinger bands (period[,k[,k_lower]])",
                build: |name, args| {
                    let upper_x100 = match args.get(1) {
                        Some(arg) => multiplier(name, arg)?,
                        None => (bollinger::DEFAULT_MULTIPLIER * 100.0).round() as u32,
                    };
                    let lower_x100 = match args.get(2) {
                        Some(arg) => multiplier(name, arg)?,
                        None => upper_x100,
                    };
                    Ok(IndicatorType::Bollinger {
                        period: period(name, &args[0])?,
                        upper_x100,
                        lower_x100,
                    })
                },
            },
            IndicatorSpec {
                name: "STOCHF",
                arities: &[1],
                summary: "fast stochastic %K (period)",
                build: |name, args| Ok(IndicatorType::StochasticFast(period(name, &args[0])?)),
            },
            IndicatorSpec {
                name: "STOCH",
                arities: &[1, 3],
                summary: "slow stochastic %K and %D (period[,k,d])",
                build: |name, args| {
                    let (k_smooth, d_smooth) = if args.len() == 3 {
                        (period(name, &args[1])?, period(name, &args[2])?)
                    } else {
                        (DEFAULT_K_SMOOTH, DEFAULT_D_SMOOTH)
                    };
                    Ok(IndicatorType::Stochastic {
                        period: period(name, &args[0])?,
                        k_smooth,
                        d_smooth,
                    })
                },
            },
            IndicatorSpec {
                name: "STOCHRSI",
                arities: &[4],
                summary: "stochastic of RSI (rsi_period,period,k,d)",
                build: |name, args| {
                    Ok(IndicatorType::StochRsi {
                        rsi_period: period(name, &args[0])?,
                        period: period(name, &args[1])?,
                        k_smooth: period(name, &args[2])?,
                        d_smooth: period(name, &args[3])?,
                    })
                },
            },
            IndicatorSpec {
                name: "WILLR",
                arities: &[1],
                summary: "Williams %R (period)",
                build: |name, args| Ok(IndicatorType::WilliamsR(period(name, &args[0])?)),
            },
            IndicatorSpec {
                name: "CCI",
                arities: &[1],
                summary: "commodity channel index (period)",
                build: |name, args| Ok(IndicatorType::Cci(period(name, &args[0])?)),
            },
            IndicatorSpec {
                name: "AROON",
                arities: &[1],
                summary: "Aroon up and down (period)",
                build: |name, args| Ok(IndicatorType::Aroon(period(name, &args[0])?)),
            },
            IndicatorSpec {
                name: "OBV",
                arities: &[0],
                summary: "on-balance volume",
                build: |_, _| Ok(IndicatorType::Obv),
            },
        ])
    }

    /// Registered indicators in registration order.
    pub fn specs(&self) -> &[IndicatorSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSpec> {
        self.index
            .get(name.to_uppercase().as_str())
            .map(|&i| &self.specs[i])
    }

    /// Looks up `name` and builds the indicator from `args`.
    pub fn resolve(&self, name: &str, args: &[String]) -> Result<IndicatorType, RegistryError> {
        let spec = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownIndicator(name.to_string()))?;
        if !spec.arities.contains(&args.len()) {
            return Err(RegistryError::ParameterCount {
                name: spec.name.to_string(),
                expected: spec.usage(),
                found: args.len(),
            });
        }
        (spec.build)(spec.name, args)
    }

    /// Resolves and applies an indicator, returning its primary column.
    pub fn invoke(
        &self,
        m: &mut Matrix,
        name: &str,
        args: &[String],
    ) -> Result<Column, RegistryError> {
        let indicator = self.resolve(name, args)?;
        debug!(%indicator, outputs = indicator.outputs(), "applying indicator");
        Ok(indicator.apply(m))
    }

    /// Parses a call expression and applies it.
    pub fn evaluate(&self, m: &mut Matrix, expr: &str) -> Result<Column, RegistryError> {
        let call = parse_call(expr)?;
        self.invoke(m, &call.name, &call.args)
    }

    /// Parses a call expression into an [`IndicatorType`] without applying it.
    pub fn parse(&self, expr: &str) -> Result<IndicatorType, RegistryError> {
        let call = parse_call(expr)?;
        self.resolve(&call.name, &call.args)
    }
}

fn period_field(
    name: &str,
    args: &[String],
    make: fn(usize, usize) -> IndicatorType,
) -> Result<IndicatorType, RegistryError> {
    let period = period(name, &args[0])?;
    let field = optional_field(name, args.get(1))?;
    Ok(make(period, field))
}

fn invalid(name: &str, value: &str, reason: &str) -> RegistryError {
    RegistryError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn period(name: &str, arg: &str) -> Result<usize, RegistryError> {
    match arg.parse::<usize>() {
        Ok(0) => Err(invalid(name, arg, "period must be at least 1")),
        Ok(n) => Ok(n),
        Err(_) => Err(invalid(name, arg, "expected a positive integer")),
    }
}

fn optional_field(name: &str, arg: Option<&String>) -> Result<usize, RegistryError> {
    match arg {
        None => Ok(CLOSE),
        Some(arg) => parse_field(arg).ok_or_else(|| {
            invalid(
                name,
                arg,
                "expected open, high, low, close, adjclose, volume or a column index",
            )
        }),
    }
}

/// `value` in whole hundredths, if it has no finer digits.
fn to_hundredths(value: f64) -> Option<u32> {
    let scaled = (value * 100.0).round();
    if !(0.0..=u32::MAX as f64).contains(&scaled) {
        return None;
    }
    (scaled / 100.0 == value).then_some(scaled as u32)
}

/// Non-negative multiplier stored in hundredths.
fn multiplier(name: &str, arg: &str) -> Result<u32, RegistryError> {
    match arg.parse::<f64>() {
        Ok(k) if k.is_finite() && k >= 0.0 => to_hundredths(k)
            .ok_or_else(|| invalid(name, arg, "multiplier must have at most two decimals")),
        _ => Err(invalid(name, arg, "expected a non-negative number")),
    }
}

/// Quantile given as a fraction in `[0, 1]`, stored as a percentage.
fn fraction_pct(name: &str, arg: &str) -> Result<u32, RegistryError> {
    match arg.parse::<f64>() {
        Ok(q) if (0.0..=1.0).contains(&q) => to_hundredths(q)
            .ok_or_else(|| invalid(name, arg, "quantile must have at most two decimals")),
        _ => Err(invalid(name, arg, "expected a number between 0 and 1")),
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.pos,
        }
    }

    fn found(&self) -> String {
        self.peek()
            .map(|c| format!("'{}'", c))
            .unwrap_or_else(|| "end of input".to_string())
    }

    fn take_while(&mut self, accept: fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if accept(ch) {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn parse_name(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(self.error(format!("expected indicator name, found {}", self.found())));
        }
        Ok(self
            .take_while(|c| c.is_ascii_alphanumeric() || c == '_')
            .to_uppercase())
    }

    fn parse_arg(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        let arg = self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if arg.is_empty() {
            return Err(self.error(format!("expected parameter, found {}", self.found())));
        }
        Ok(arg.to_string())
    }

    fn parse_args(&mut self) -> Result<Vec<String>, ParseError> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Ok(args);
        }
        self.advance();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_arg()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                Some(')') => {
                    self.advance();
                    return Ok(args);
                }
                _ => {
                    return Err(self.error(format!("expected ',' or ')', found {}", self.found())));
                }
            }
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error(format!("unexpected trailing input {}", self.found()))),
        }
    }
}

/// Parses `NAME`, `NAME()` or `NAME(arg, ...)`. The name is upper-cased.
pub fn parse_call(input: &str) -> Result<Call, ParseError> {
    let mut parser = Parser::new(input);
    let name = parser.parse_name()?;
    let args = parser.parse_args()?;
    parser.expect_end()?;
    Ok(Call { name, args })
}
