//! Error types for the loading, configuration and dispatch layers.
//!
//! The column engine itself never fails: out-of-range reads yield `0.0`,
//! out-of-range writes are ignored and zero denominators leave the default.

/// A parse error with position information for indicator expressions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Failures reported by the indicator registry to its caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("{name} accepts {expected} parameter(s), got {found}")]
    ParameterCount {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("invalid parameter '{value}' for {name}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Top-level error type for barmatrix.
#[derive(Debug, thiserror::Error)]
pub enum BarmatrixError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BarmatrixError> for std::process::ExitCode {
    fn from(err: &BarmatrixError) -> Self {
        let code: u8 = match err {
            BarmatrixError::Io(_) => 1,
            BarmatrixError::ConfigParse { .. }
            | BarmatrixError::ConfigMissing { .. }
            | BarmatrixError::ConfigInvalid { .. } => 2,
            BarmatrixError::Data { .. } | BarmatrixError::NoData { .. } => 3,
            BarmatrixError::Registry(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
