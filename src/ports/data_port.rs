//! Bar loading port.

use crate::domain::error::BarmatrixError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// All bars for `symbol`, oldest first.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BarmatrixError>;
}
