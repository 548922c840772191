//! OBV (On-Balance Volume).
//!
//! OBV[0] = volume[0]
//! If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
//! If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
//! If close[i] == close[i-1]: OBV[i] = OBV[i-1]
//!
//! No warmup period.

use crate::domain::column::Column;
use crate::domain::indicator::IndicatorType;
use crate::domain::matrix::Matrix;
use crate::domain::ohlcv::{CLOSE, VOLUME};

pub fn obv(m: &mut Matrix) -> Column {
    let out = m.add_named_column(IndicatorType::Obv.to_string());
    let mut total = 0.0;
    for i in 0..m.len() {
        let volume = m.get(i, VOLUME);
        if i == 0 {
            total = volume;
        } else {
            let close = m.get(i, CLOSE);
            let prev_close = m.get(i - 1, CLOSE);
            if close > prev_close {
                total += volume;
            } else if close < prev_close {
                total -= volume;
            }
        }
        m.set(i, out, total);
    }
    out
}
