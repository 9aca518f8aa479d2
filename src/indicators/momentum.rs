//! Momentum indicators: RSI (Wilder) and MACD

use super::{ema_values, IndicatorPoint, MacdPoint};
use crate::Ohlc;

/// Relative Strength Index with Wilder smoothing.
///
/// Average gain/loss are seeded from the first `period` close-to-close deltas
/// (losses stored as positive magnitudes); the first value is emitted at
/// `bars[period]`. Afterwards `avg = (avg * (period - 1) + current) / period`.
/// RSI saturates to 100 when the average loss is zero.
pub fn rsi<T: Ohlc>(bars: &[T], period: usize) -> Vec<IndicatorPoint> {
    if period == 0 || bars.len() <= period {
        return Vec::new();
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..=period {
        let change = bars[i].close() - bars[i - 1].close();
        if change >= 0.0 {
            gain_sum += change;
        } else {
            loss_sum -= change;
        }
    }

    let p = period as f64;
    let mut avg_gain = gain_sum / p;
    let mut avg_loss = loss_sum / p;

    let mut out = Vec::with_capacity(bars.len() - period);
    out.push(IndicatorPoint { date: bars[period].date(), value: rsi_value(avg_gain, avg_loss) });

    for i in period + 1..bars.len() {
        let change = bars[i].close() - bars[i - 1].close();
        avg_gain = (avg_gain * (p - 1.0) + change.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-change).max(0.0)) / p;
        out.push(IndicatorPoint { date: bars[i].date(), value: rsi_value(avg_gain, avg_loss) });
    }

    out
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Moving Average Convergence Divergence.
///
/// The MACD line is `EMA(fast) - EMA(slow)` from the later of the two EMA
/// warm-ups; the signal line is the EMA of the MACD line over `signal_period`
/// and `histogram = macd - signal`. Empty when any period is zero or
/// `bars.len() < slow + signal_period`.
pub fn macd<T: Ohlc>(bars: &[T], fast: usize, slow: usize, signal_period: usize) -> Vec<MacdPoint> {
    if fast == 0 || slow == 0 || signal_period == 0 || bars.len() < slow + signal_period {
        return Vec::new();
    }

    let closes: Vec<f64> = bars.iter().map(Ohlc::close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    // (bar index, macd) where both EMAs exist
    let line: Vec<(usize, f64)> = ema_fast
        .iter()
        .zip(&ema_slow)
        .enumerate()
        .filter_map(|(i, (f, s))| Some((i, (*f)? - (*s)?)))
        .collect();

    let macd_values: Vec<f64> = line.iter().map(|&(_, m)| m).collect();
    let signal = ema_values(&macd_values, signal_period);

    line.iter()
        .zip(signal)
        .filter_map(|(&(i, macd), sig)| {
            let signal = sig?;
            Some(MacdPoint { date: bars[i].date(), macd, signal, histogram: macd - signal })
        })
        .collect()
}
