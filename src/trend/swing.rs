//! Fractal swing detection and validation
//!
//! Stage 1 marks bar `i` as a swing high when its high strictly exceeds the
//! highs of the `fractal_window` bars on each side (swing low: strictly below
//! the neighbouring lows). Stage 2 walks the candidates in time order and keeps
//! only confirmed pivots, comparing each one with the last accepted swing.
//!
//! The thresholds in [`SwingConfig`] were chosen empirically and are exposed as
//! tunable parameters through [`ParameterizedStudy`].

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::params::{check_overrides, get_period, get_ratio, ParamMeta, ParameterizedStudy};
use crate::{AnalysisError, Ohlc, Period, Ratio, Result};

/// Fewest bars swing detection runs on
pub const MIN_SWING_BARS: usize = 11;

/// A local price extreme
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwingPoint {
    /// Position in the bar sequence
    pub index: usize,
    pub date: NaiveDate,
    pub is_high: bool,
    pub price: f64,
}

/// Swing detection and validation thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingConfig {
    /// Bars on each side a fractal must dominate
    pub fractal_window: Period,
    /// Minimum bar distance from the previous accepted swing
    pub min_separation: Period,
    /// Minimum |price change| relative to the average of the two prices
    pub min_price_change: Ratio,
    /// Accepted-swing count from which highs and lows must alternate
    pub alternation_after: Period,
    /// Bars after the swing that must not take out its price
    pub hold_window: Period,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            fractal_window: Period::new_const(3),
            min_separation: Period::new_const(3),
            min_price_change: Ratio::new_const(0.01),
            alternation_after: Period::new_const(3),
            hold_window: Period::new_const(10),
        }
    }
}

impl SwingConfig {
    pub fn validate(&self) -> Result<()> {
        let min_bars = 2 * self.fractal_window.get() + 1;
        if min_bars > MIN_SWING_BARS {
            return Err(AnalysisError::InvalidConfig(format!(
                "fractal_window {} needs {} bars, more than the {} bar minimum",
                self.fractal_window.get(),
                min_bars,
                MIN_SWING_BARS
            )));
        }
        Ok(())
    }
}

/// Stage 1: every fractal high/low, in time order.
///
/// A bar that is both a high and a low fractal yields two points, high first.
/// Returns nothing for fewer than [`MIN_SWING_BARS`] bars.
pub fn detect_swings<T: Ohlc>(bars: &[T], config: &SwingConfig) -> Vec<SwingPoint> {
    let w = config.fractal_window.get();
    if bars.len() < MIN_SWING_BARS || bars.len() < 2 * w + 1 {
        return Vec::new();
    }

    let mut swings = Vec::new();
    for i in w..bars.len() - w {
        let neighbours = (i - w..i).chain(i + 1..=i + w);

        let high = bars[i].high();
        if neighbours.clone().all(|j| high > bars[j].high()) {
            swings.push(SwingPoint { index: i, date: bars[i].date(), is_high: true, price: high });
        }

        let low = bars[i].low();
        if neighbours.clone().all(|j| low < bars[j].low()) {
            swings.push(SwingPoint { index: i, date: bars[i].date(), is_high: false, price: low });
        }
    }
    swings
}

/// Stage 2: keep confirmed pivots.
///
/// A candidate is rejected when, relative to the last accepted swing, it
/// - moved less than `min_price_change` of the two prices' average,
/// - sits fewer than `min_separation` bars away,
/// - repeats the same side once `alternation_after` swings are accepted,
///
/// or when any of the next `hold_window` bars trades through its price.
///
/// Candidates are expected in time order, as [`detect_swings`] returns them.
/// One that sits before the last accepted swing is dropped by the separation
/// check.
pub fn validate_swings<T: Ohlc>(bars: &[T], swings: &[SwingPoint], config: &SwingConfig) -> Vec<SwingPoint> {
    let mut accepted: Vec<SwingPoint> = Vec::with_capacity(swings.len());

    for &swing in swings {
        if let Some(prev) = accepted.last() {
            let avg = (swing.price + prev.price) / 2.0;
            if avg.abs() <= f64::EPSILON || (swing.price - prev.price).abs() / avg < config.min_price_change.get() {
                continue;
            }
            if swing.index < prev.index + config.min_separation.get() {
                continue;
            }
            if accepted.len() >= config.alternation_after.get() && swing.is_high == prev.is_high {
                continue;
            }
        }

        if !holds(bars, &swing, config.hold_window.get()) {
            continue;
        }

        accepted.push(swing);
    }

    accepted
}

/// True when no bar in the window after the swing trades through its price
fn holds<T: Ohlc>(bars: &[T], swing: &SwingPoint, window: usize) -> bool {
    let end = (swing.index + window).min(bars.len().saturating_sub(1));
    let after = bars.get(swing.index + 1..=end).unwrap_or(&[]);

    if swing.is_high {
        after.iter().all(|b| b.high() <= swing.price)
    } else {
        after.iter().all(|b| b.low() >= swing.price)
    }
}

/// Stages 1 and 2 together
pub fn find_swings<T: Ohlc>(bars: &[T], config: &SwingConfig) -> Vec<SwingPoint> {
    let candidates = detect_swings(bars, config);
    let validated = validate_swings(bars, &candidates, config);

    debug!(
        bars = bars.len(),
        candidates = candidates.len(),
        validated = validated.len(),
        "swing points detected"
    );

    validated
}

// ============================================================
// PARAMETERS
// ============================================================

static SWING_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("fractal_window", 3.0, (2.0, 5.0), "Bars on each side of a fractal"),
    ParamMeta::period("min_separation", 3.0, (1.0, 10.0), "Minimum bars between accepted swings"),
    ParamMeta::ratio("min_price_change", 0.01, (0.0, 0.05), "Minimum relative move between swings"),
    ParamMeta::period("alternation_after", 3.0, (1.0, 10.0), "Accepted swings before highs/lows must alternate"),
    ParamMeta::period("hold_window", 10.0, (3.0, 30.0), "Bars a swing must hold as an extreme"),
];

impl ParameterizedStudy for SwingConfig {
    fn param_meta() -> &'static [ParamMeta] {
        SWING_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_overrides(SWING_PARAMS, params)?;
        let config = Self {
            fractal_window: get_period(params, "fractal_window", 3)?,
            min_separation: get_period(params, "min_separation", 3)?,
            min_price_change: get_ratio(params, "min_price_change", 0.01)?,
            alternation_after: get_period(params, "alternation_after", 3)?,
            hold_window: get_period(params, "hold_window", 10)?,
        };
        config.validate()?;
        Ok(config)
    }
}
