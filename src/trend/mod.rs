//! Geometric trend-line detectors
//!
//! - [`hull`]: support/resistance from the lower/upper convex hull of lows/highs
//! - [`swing`]: fractal swing detection and validation
//! - [`fibonacci`]: swing-pair retracement sets with level invalidation
//! - [`line`]: user-anchored trend lines extended to chart boundaries

use chrono::NaiveDate;
use serde::Serialize;

pub mod fibonacci;
pub mod geometry;
pub mod hull;
pub mod line;
pub mod swing;

pub use fibonacci::*;
pub use hull::*;
pub use line::*;
pub use swing::*;

/// A line anchored at two dates/prices.
///
/// Consumers render it as a (possibly extended) ray; colour, dash and label
/// metadata are assigned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSegment {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_value: f64,
    pub end_value: f64,
}

impl TrendSegment {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, start_value: f64, end_value: f64) -> Self {
        Self { start_date, end_date, start_value, end_value }
    }

    /// Horizontal segment at `value`
    pub fn flat(start_date: NaiveDate, end_date: NaiveDate, value: f64) -> Self {
        Self::new(start_date, end_date, value, value)
    }

    /// Calendar-day span between the two anchors
    #[inline]
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}
