//! Simple and exponential moving averages of closes
//!
//! Both averages are exposed as lazily produced iterators ([`Sma`], [`Ema`]) for
//! streaming consumers, plus eager collectors ([`sma`], [`ema`]).

use super::{ema_factor, IndicatorPoint};
use crate::Ohlc;

/// Sliding-window arithmetic mean of closes.
///
/// Yields nothing when `period == 0` or the input is shorter than `period`.
/// The first value aligns to `bars[period - 1]`.
#[derive(Debug, Clone)]
pub struct Sma<'a, T: Ohlc> {
    bars: &'a [T],
    period: usize,
    index: usize,
    sum: f64,
}

impl<'a, T: Ohlc> Sma<'a, T> {
    pub fn new(bars: &'a [T], period: usize) -> Self {
        if period == 0 || bars.len() < period {
            return Self { bars, period, index: bars.len(), sum: 0.0 };
        }

        let sum = bars[..period - 1].iter().map(Ohlc::close).sum();
        Self { bars, period, index: period - 1, sum }
    }
}

impl<T: Ohlc> Iterator for Sma<'_, T> {
    type Item = IndicatorPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let bar = self.bars.get(self.index)?;

        self.sum += bar.close();
        if self.index >= self.period {
            self.sum -= self.bars[self.index - self.period].close();
        }
        self.index += 1;

        Some(IndicatorPoint { date: bar.date(), value: self.sum / self.period as f64 })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bars.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Ohlc> ExactSizeIterator for Sma<'_, T> {}

/// Exponential moving average of closes.
///
/// Seeded with the SMA of the first `period` closes at index `period - 1`,
/// then `ema[i] = (close[i] - ema[i-1]) * k + ema[i-1]` with `k = 2 / (period + 1)`.
#[derive(Debug, Clone)]
pub struct Ema<'a, T: Ohlc> {
    bars: &'a [T],
    period: usize,
    index: usize,
    prev: f64,
    k: f64,
}

impl<'a, T: Ohlc> Ema<'a, T> {
    pub fn new(bars: &'a [T], period: usize) -> Self {
        let index = if period == 0 || bars.len() < period { bars.len() } else { period - 1 };
        Self { bars, period, index, prev: 0.0, k: ema_factor(period) }
    }
}

impl<T: Ohlc> Iterator for Ema<'_, T> {
    type Item = IndicatorPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let bar = self.bars.get(self.index)?;

        self.prev = if self.index + 1 == self.period {
            self.bars[..self.period].iter().map(Ohlc::close).sum::<f64>() / self.period as f64
        } else {
            (bar.close() - self.prev) * self.k + self.prev
        };
        self.index += 1;

        Some(IndicatorPoint { date: bar.date(), value: self.prev })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bars.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Ohlc> ExactSizeIterator for Ema<'_, T> {}

/// Collect the full SMA series
pub fn sma<T: Ohlc>(bars: &[T], period: usize) -> Vec<IndicatorPoint> {
    Sma::new(bars, period).collect()
}

/// Collect the full EMA series
pub fn ema<T: Ohlc>(bars: &[T], period: usize) -> Vec<IndicatorPoint> {
    Ema::new(bars, period).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;
    use chrono::NaiveDate;

    fn closes(values: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(start + chrono::Days::new(i as u64), c, c, c, c))
            .collect()
    }

    #[test]
    fn test_sma_alignment() {
        let bars = closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = sma(&bars, 3);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].date, bars[2].date);
        assert_eq!(out[0].value, 2.0);
        assert_eq!(out[2].value, 4.0);
    }

    #[test]
    fn test_sma_soft_failures() {
        let bars = closes(&[1.0, 2.0]);
        assert!(sma(&bars, 0).is_empty());
        assert!(sma(&bars, 3).is_empty());
        assert_eq!(sma(&bars, 2).len(), 1);
    }

    #[test]
    fn test_sma_period_one_is_close() {
        let bars = closes(&[3.0, 7.0, 11.0]);
        let values: Vec<f64> = sma(&bars, 1).iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 7.0, 11.0]);
    }

    #[test]
    fn test_ema_seed_is_sma() {
        let bars = closes(&[2.0, 4.0, 6.0, 8.0]);
        let out = ema(&bars, 3);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, bars[2].date);
        assert_eq!(out[0].value, 4.0);
        // (8 - 4) * 0.5 + 4
        assert_eq!(out[1].value, 6.0);
    }

    #[test]
    fn test_ema_soft_failures() {
        let bars = closes(&[1.0, 2.0]);
        assert!(ema(&bars, 0).is_empty());
        assert!(ema(&bars, 5).is_empty());
    }

    #[test]
    fn test_iterators_exact_size() {
        let bars = closes(&[1.0; 10]);
        let mut it = Sma::new(&bars, 4);
        assert_eq!(it.len(), 7);
        it.next();
        assert_eq!(it.len(), 6);
        assert_eq!(Ema::new(&bars, 4).len(), 7);
        assert_eq!(Ema::new(&bars, 11).len(), 0);
    }
}
