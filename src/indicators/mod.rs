//! Classic technical indicators over daily OHLC bars
//!
//! Every indicator returns a date-aligned series that is shorter than the input
//! by its warm-up offset:
//!
//! - **SMA / EMA**: first value at `bars[period - 1]`
//! - **RSI**: first value at `bars[period]` (needs `period` close-to-close deltas)
//! - **MACD**: first value where both EMAs and the signal EMA are defined
//! - **DPO**: aligned to the SMA offset
//!
//! Insufficient data never fails: the result is simply empty.

use chrono::NaiveDate;
use serde::Serialize;

pub mod momentum;
pub mod moving_average;
pub mod oscillator;

pub use momentum::*;
pub use moving_average::*;
pub use oscillator::*;

/// One aligned indicator sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One aligned MACD sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdPoint {
    pub date: NaiveDate,
    pub macd: f64,
    pub signal: f64,
    /// Always `macd - signal`
    pub histogram: f64,
}

/// Default RSI lookback
pub const DEFAULT_RSI_PERIOD: usize = 14;
/// Default SMA / EMA / DPO lookback
pub const DEFAULT_AVERAGE_PERIOD: usize = 20;
/// Default MACD fast EMA
pub const DEFAULT_MACD_FAST: usize = 12;
/// Default MACD slow EMA
pub const DEFAULT_MACD_SLOW: usize = 26;
/// Default MACD signal EMA
pub const DEFAULT_MACD_SIGNAL: usize = 9;

/// EMA smoothing factor `2 / (period + 1)`
#[inline]
pub(crate) fn ema_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// EMA over a raw value slice, seeded with the SMA of the first `period` values.
///
/// The output has the same length as `values`; entries before `period - 1`
/// are `None`. Returns all-`None` when the slice is shorter than `period`.
pub(crate) fn ema_values(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    let k = ema_factor(period);
    let mut prev = seed;
    for (i, &v) in values.iter().enumerate().skip(period) {
        prev = (v - prev) * k + prev;
        out[i] = Some(prev);
    }
    out
}
