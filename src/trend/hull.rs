//! Convex-hull support and resistance lines
//!
//! Lows and highs are placed at their bar index, so x is already sorted and a
//! single monotone-chain sweep builds each hull in linear time.
//!
//! - **Support**: lower hull of `(i, low_i)` (pop on non-left turns)
//! - **Resistance**: upper hull of `(i, high_i)` (pop on non-right turns)
//!
//! Each consecutive vertex pair becomes a segment extended to the last bar,
//! unless it touches the last bar or spans fewer than `min_span` bars.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::geometry::{cross, extrapolate, Point};
use super::TrendSegment;
use crate::params::{check_overrides, get_period, ParamMeta, ParamType, ParameterizedStudy};
use crate::{Ohlc, Period, Result};

/// Fewest bars a hull needs before any segment is considered
pub const MIN_HULL_BARS: usize = 3;

/// Hull detector settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullConfig {
    /// Minimum bar-index distance between the two vertices of a segment
    pub min_span: Period,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self { min_span: Period::new_const(3) }
    }
}

/// Support and resistance segments, each list ordered by time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HullLines {
    pub support: Vec<TrendSegment>,
    pub resistance: Vec<TrendSegment>,
}

impl HullLines {
    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.resistance.is_empty()
    }
}

/// Lower convex hull of points sorted by index
pub fn lower_hull(points: &[Point]) -> Vec<Point> {
    monotone_chain(points, |turn| turn <= 0.0)
}

/// Upper convex hull of points sorted by index
pub fn upper_hull(points: &[Point]) -> Vec<Point> {
    monotone_chain(points, |turn| turn >= 0.0)
}

fn monotone_chain(points: &[Point], pop: impl Fn(f64) -> bool) -> Vec<Point> {
    let mut hull: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        while hull.len() >= 2 && pop(cross(hull[hull.len() - 2], hull[hull.len() - 1], p)) {
            hull.pop();
        }
        hull.push(p);
    }
    hull
}

/// Detect support (lower hull of lows) and resistance (upper hull of highs).
///
/// Returns no segments for fewer than [`MIN_HULL_BARS`] bars.
pub fn hull_lines<T: Ohlc>(bars: &[T], config: &HullConfig) -> HullLines {
    if bars.len() < MIN_HULL_BARS {
        return HullLines::default();
    }

    let lows: Vec<Point> = bars.iter().enumerate().map(|(i, b)| Point::new(i, b.low())).collect();
    let highs: Vec<Point> = bars.iter().enumerate().map(|(i, b)| Point::new(i, b.high())).collect();

    let lower = lower_hull(&lows);
    let upper = upper_hull(&highs);

    let lines = HullLines {
        support: extend_edges(bars, &lower, config.min_span.get()),
        resistance: extend_edges(bars, &upper, config.min_span.get()),
    };

    debug!(
        bars = bars.len(),
        lower_vertices = lower.len(),
        upper_vertices = upper.len(),
        support = lines.support.len(),
        resistance = lines.resistance.len(),
        "hull trend lines computed"
    );

    lines
}

fn extend_edges<T: Ohlc>(bars: &[T], hull: &[Point], min_span: usize) -> Vec<TrendSegment> {
    let last = bars.len() - 1;
    let last_date = bars[last].date();

    hull.windows(2)
        .filter_map(|edge| {
            let (a, b) = (edge[0], edge[1]);
            // the newest bar cannot confirm a line yet
            if a.index == last || b.index == last {
                return None;
            }
            if b.index - a.index < min_span {
                return None;
            }
            Some(TrendSegment::new(bars[a.index].date(), last_date, a.value, extrapolate(a, b, last)))
        })
        .collect()
}

// ============================================================
// PARAMETERS
// ============================================================

static HULL_PARAMS: &[ParamMeta] = &[ParamMeta {
    name: "min_span",
    param_type: ParamType::Period,
    default: 3.0,
    range: (2.0, 10.0),
    description: "Minimum bar distance between hull vertices",
}];

impl ParameterizedStudy for HullConfig {
    fn param_meta() -> &'static [ParamMeta] {
        HULL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_overrides(HULL_PARAMS, params)?;
        Ok(Self { min_span: get_period(params, "min_span", 3)? })
    }
}
