//! `[analysis]` configuration, validated before any data is read.

use std::path::PathBuf;

use crate::domain::error::BarmatrixError;
use crate::domain::swing::DEFAULT_SWING_SIZE;
use crate::ports::config_port::ConfigPort;

pub const SECTION: &str = "analysis";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub symbol: String,
    /// Indicator call expressions, in the order they are applied.
    pub indicators: Vec<String>,
    pub swing_size: usize,
    pub output: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, BarmatrixError> {
        let data_dir = required(config, "data_dir")?;
        let symbol = required(config, "symbol")?;

        let indicators = config
            .get_string(SECTION, "indicators")
            .map(|list| split_list(&list))
            .unwrap_or_default();

        let swing_size = config.get_int(SECTION, "swing_size", DEFAULT_SWING_SIZE as i64);
        if swing_size < 1 {
            return Err(invalid("swing_size", "swing_size must be at least 1"));
        }

        let output = config
            .get_string(SECTION, "output")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            symbol,
            indicators,
            swing_size: swing_size as usize,
            output,
        })
    }
}

fn required(config: &dyn ConfigPort, key: &str) -> Result<String, BarmatrixError> {
    match config.get_string(SECTION, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(BarmatrixError::ConfigMissing {
            section: SECTION.to_string(),
            key: key.to_string(),
        }),
    }
}

fn invalid(key: &str, reason: &str) -> BarmatrixError {
    BarmatrixError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Splits a comma-separated list of call expressions. Commas inside
/// parentheses belong to the expression; blank entries are dropped.
pub fn split_list(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in list.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);
    items
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
