//! Detrended price oscillator

use super::{IndicatorPoint, Sma};
use crate::Ohlc;

/// `close[i] - SMA(period)[i]`, aligned to the SMA warm-up offset.
pub fn detrended_price_oscillator<T: Ohlc>(bars: &[T], period: usize) -> Vec<IndicatorPoint> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }

    bars[period - 1..]
        .iter()
        .zip(Sma::new(bars, period))
        .map(|(bar, avg)| IndicatorPoint { date: avg.date, value: bar.close() - avg.value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bar;
    use chrono::NaiveDate;

    #[test]
    fn test_dpo_linear_trend() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let bars: Vec<Bar> = (0..10)
            .map(|i| {
                let c = 10.0 + i as f64;
                Bar::new(start + chrono::Days::new(i), c, c, c, c)
            })
            .collect();

        let out = detrended_price_oscillator(&bars, 5);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].date, bars[4].date);
        // close sits 2 above the trailing 5-bar mean of a unit-slope line
        assert!(out.iter().all(|p| (p.value - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_dpo_insufficient() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let bars = vec![Bar::new(start, 1.0, 1.0, 1.0, 1.0)];
        assert!(detrended_price_oscillator(&bars, 2).is_empty());
        assert!(detrended_price_oscillator(&bars, 0).is_empty());
    }
}
