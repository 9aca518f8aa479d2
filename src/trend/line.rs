//! Caller-anchored trend lines
//!
//! Unlike the detectors these lines come from user-picked prices; the slope is
//! measured per calendar day so weekends and holidays do not bend the line.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TrendSegment;

/// A price pinned to a calendar date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedPrice {
    pub date: NaiveDate,
    pub value: f64,
}

impl DatedPrice {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Horizontal line across the chart
pub fn horizontal_line(chart_start: NaiveDate, chart_end: NaiveDate, value: f64) -> TrendSegment {
    TrendSegment::flat(chart_start, chart_end, value)
}

/// Line through `from` and `to`, extended to both chart boundaries.
///
/// Anchors on the same day give a zero slope.
pub fn extend_line(chart_start: NaiveDate, chart_end: NaiveDate, from: DatedPrice, to: DatedPrice) -> TrendSegment {
    let days = (to.date - from.date).num_days();
    let slope = if days != 0 { (to.value - from.value) / days as f64 } else { 0.0 };

    let before = (from.date - chart_start).num_days() as f64;
    let after = (chart_end - to.date).num_days() as f64;

    TrendSegment::new(chart_start, chart_end, from.value - slope * before, to.value + slope * after)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_extend_line_both_ways() {
        let seg = extend_line(
            day(8, 1),
            day(8, 31),
            DatedPrice::new(day(8, 11), 100.0),
            DatedPrice::new(day(8, 21), 110.0),
        );

        assert_eq!(seg.start_date, day(8, 1));
        assert_eq!(seg.end_date, day(8, 31));
        assert!((seg.start_value - 90.0).abs() < 1e-12);
        assert!((seg.end_value - 120.0).abs() < 1e-12);
    }

    #[test]
    fn test_extend_line_same_day_is_flat() {
        let p = DatedPrice::new(day(8, 11), 50.0);
        let seg = extend_line(day(8, 1), day(8, 31), p, DatedPrice::new(day(8, 11), 70.0));
        assert_eq!(seg.start_value, 50.0);
        assert_eq!(seg.end_value, 70.0);
    }

    #[test]
    fn test_horizontal_line() {
        let seg = horizontal_line(day(1, 2), day(3, 4), 42.5);
        assert_eq!(seg.start_value, seg.end_value);
        assert_eq!(seg.span_days(), 61);
    }
}
