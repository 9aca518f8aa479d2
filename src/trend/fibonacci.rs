//! Fibonacci retracement sets from validated swing pairs
//!
//! Pipeline on top of [`find_swings`]:
//!
//! 3. **Set construction**: every ordered swing pair forming a clean trend leg
//!    (low then higher high, or high then lower low, with no intermediate swing
//!    beyond the leg's end) becomes a [`FibonacciSet`]. Only the `max_sets` most
//!    recently constructed legs are kept: older legs rarely matter for the
//!    current chart and the cap keeps the output readable.
//! 4. **Level invalidation**: every bar after the leg's end can break inside
//!    levels (23.6%..61.8%). A set with all four broken is no longer valid.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::swing::{find_swings, SwingConfig, SwingPoint};
use super::TrendSegment;
use crate::params::{check_overrides, get_period, get_ratio, ParamMeta, ParameterizedStudy};
use crate::{Ohlc, Period, Ratio, Result};

/// Levels drawn for every valid set, as fractions of the range above `low`
pub const FIB_RATIOS: [f64; 6] = [0.0, 0.236, 0.382, 0.5, 0.618, 1.0];

/// Levels that can be invalidated by later price action
pub const INSIDE_RATIOS: [f64; 4] = [0.236, 0.382, 0.5, 0.618];

/// Manual-grid retracements, measured down from the high
pub const RETRACEMENT_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.764];

/// Manual-grid extensions beyond the range on both sides
pub const EXTENSION_RATIOS: [f64; 2] = [1.272, 1.618];

/// Retracement engine settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibonacciConfig {
    /// Fewest bars the engine runs on
    pub min_bars: Period,
    /// Minimum leg range as a fraction of its high
    pub min_range: Ratio,
    /// Most recent sets kept
    pub max_sets: Period,
    pub swing: SwingConfig,
}

impl Default for FibonacciConfig {
    fn default() -> Self {
        Self {
            min_bars: Period::new_const(50),
            min_range: Ratio::new_const(0.005),
            max_sets: Period::new_const(8),
            swing: SwingConfig::default(),
        }
    }
}

impl FibonacciConfig {
    pub fn validate(&self) -> Result<()> {
        self.swing.validate()
    }
}

/// Validity of the four inside levels of one set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelState {
    /// Broken flags for 23.6 / 38.2 / 50 / 61.8 %
    pub invalidated: [bool; 4],
    pub is_valid: bool,
}

impl Default for LevelState {
    fn default() -> Self {
        Self { invalidated: [false; 4], is_valid: true }
    }
}

impl LevelState {
    #[inline]
    pub fn all_invalidated(&self) -> bool {
        self.invalidated.iter().all(|&b| b)
    }
}

/// A retracement range between two confirmed swings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FibonacciSet {
    pub start_index: usize,
    pub end_index: usize,
    pub start_date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub is_uptrend: bool,
    state: LevelState,
}

impl FibonacciSet {
    fn from_leg(first: &SwingPoint, second: &SwingPoint) -> Self {
        Self {
            start_index: first.index,
            end_index: second.index,
            start_date: first.date,
            high: first.price.max(second.price),
            low: first.price.min(second.price),
            is_uptrend: second.is_high,
            state: LevelState::default(),
        }
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Price at `ratio` of the range above `low`
    #[inline]
    pub fn level_price(&self, ratio: f64) -> f64 {
        self.low + self.range() * ratio
    }

    pub fn invalidated_levels(&self) -> [bool; 4] {
        self.state.invalidated
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    /// Break inside levels crossed against the trend by bars after the leg
    fn invalidate<T: Ohlc>(&mut self, bars: &[T]) {
        let prices = INSIDE_RATIOS.map(|r| self.level_price(r));
        let mut state = self.state;

        for bar in bars.iter().skip(self.end_index + 1) {
            for (broken, &price) in state.invalidated.iter_mut().zip(&prices) {
                if *broken {
                    continue;
                }
                *broken = if self.is_uptrend { bar.low() < price } else { bar.high() > price };
            }
            if state.all_invalidated() {
                break;
            }
        }

        state.is_valid = !state.all_invalidated();
        self.state = state;
    }
}

/// How a drawn level relates to its set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LevelKind {
    /// 0% / 100% range bounds
    Anchor,
    Retracement,
    Extension,
}

/// One horizontal level ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FibonacciLine {
    pub segment: TrendSegment,
    pub ratio: f64,
    pub label: String,
    pub kind: LevelKind,
}

impl FibonacciLine {
    fn new(segment: TrendSegment, ratio: f64, kind: LevelKind) -> Self {
        Self { segment, ratio, label: level_label(ratio), kind }
    }
}

/// `0.236` -> `"23.6%"`, `0.5` -> `"50%"`
pub fn level_label(ratio: f64) -> String {
    let pct = format!("{:.1}", ratio * 100.0);
    format!("{}%", pct.strip_suffix(".0").unwrap_or(&pct))
}

/// Stage 3: trend legs from validated swings, most recent `max_sets` kept.
///
/// Pairs are visited newest-first so the search stops as soon as the cap is
/// reached; the result is in construction order (first swing, then second).
pub fn build_sets(swings: &[SwingPoint], config: &FibonacciConfig) -> Vec<FibonacciSet> {
    let cap = config.max_sets.get();
    let mut sets = Vec::with_capacity(cap);

    'outer: for i in (0..swings.len()).rev() {
        for j in (i + 1..swings.len()).rev() {
            if let Some(set) = leg(swings, i, j, config.min_range.get()) {
                sets.push(set);
                if sets.len() == cap {
                    break 'outer;
                }
            }
        }
    }

    sets.reverse();
    sets
}

fn leg(swings: &[SwingPoint], i: usize, j: usize, min_range: f64) -> Option<FibonacciSet> {
    let (first, second) = (&swings[i], &swings[j]);
    if first.index >= second.index {
        return None;
    }

    let uptrend = !first.is_high && second.is_high && second.price > first.price;
    let downtrend = first.is_high && !second.is_high && second.price < first.price;
    if !uptrend && !downtrend {
        return None;
    }

    let mut between = swings[i + 1..j]
        .iter()
        .filter(|s| s.index > first.index && s.index < second.index);
    let overshoot = if uptrend {
        between.any(|s| s.is_high && s.price > second.price)
    } else {
        between.any(|s| !s.is_high && s.price < second.price)
    };
    if overshoot {
        return None;
    }

    let set = FibonacciSet::from_leg(first, second);
    if set.high <= 0.0 || set.range() / set.high < min_range {
        return None;
    }
    Some(set)
}

/// Stage 4: mark broken levels on every set
pub fn invalidate_levels<T: Ohlc>(bars: &[T], sets: &mut [FibonacciSet]) {
    for set in sets.iter_mut() {
        set.invalidate(bars);
    }
}

/// Full pipeline: swings, sets and invalidation.
///
/// Empty for fewer than `config.min_bars` bars.
pub fn fibonacci_sets<T: Ohlc>(bars: &[T], config: &FibonacciConfig) -> Vec<FibonacciSet> {
    if bars.len() < config.min_bars.get() {
        return Vec::new();
    }

    let swings = find_swings(bars, &config.swing);
    let mut sets = build_sets(&swings, config);
    invalidate_levels(bars, &mut sets);

    debug!(
        swings = swings.len(),
        sets = sets.len(),
        valid = sets.iter().filter(|s| s.is_valid()).count(),
        "fibonacci sets built"
    );

    sets
}

/// Lines for every valid set, longest span first.
///
/// Each valid set contributes its 0% and 100% anchors plus every inside level
/// that is still intact, all running from the set's start date to the last bar.
pub fn fibonacci_lines<T: Ohlc>(bars: &[T], config: &FibonacciConfig) -> Vec<FibonacciLine> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    set_lines(&fibonacci_sets(bars, config), last.date())
}

/// Lines for already built sets, ending at `end`
pub fn set_lines(sets: &[FibonacciSet], end: NaiveDate) -> Vec<FibonacciLine> {
    let mut lines = level_lines(sets, end);
    lines.sort_by_key(|l| Reverse(l.segment.span_days()));
    lines
}

fn level_lines(sets: &[FibonacciSet], end: NaiveDate) -> Vec<FibonacciLine> {
    let mut lines = Vec::new();
    for set in sets.iter().filter(|s| s.is_valid()) {
        let flat = |ratio: f64| TrendSegment::flat(set.start_date, end, set.level_price(ratio));

        for (k, &ratio) in FIB_RATIOS.iter().enumerate() {
            let anchor = k == 0 || k == FIB_RATIOS.len() - 1;
            if anchor {
                lines.push(FibonacciLine::new(flat(ratio), ratio, LevelKind::Anchor));
            } else if !set.state.invalidated[k - 1] {
                lines.push(FibonacciLine::new(flat(ratio), ratio, LevelKind::Retracement));
            }
        }
    }
    lines
}

/// Fixed retracement/extension grid for a caller-chosen high and low.
///
/// Retracements are measured down from `high`; each extension is drawn both
/// below `low` and above `high`. The `high` (0%) and `low` (100%) reference
/// lines come last.
pub fn retracement_lines(start: NaiveDate, end: NaiveDate, high: f64, low: f64) -> Vec<FibonacciLine> {
    let range = high - low;
    let mut lines = Vec::with_capacity(RETRACEMENT_RATIOS.len() + 2 * EXTENSION_RATIOS.len() + 2);

    for &ratio in &RETRACEMENT_RATIOS {
        let level = high - range * ratio;
        lines.push(FibonacciLine::new(TrendSegment::flat(start, end, level), ratio, LevelKind::Retracement));
    }

    for &ratio in &EXTENSION_RATIOS {
        let below = low - range * (ratio - 1.0);
        let above = high + range * (ratio - 1.0);
        lines.push(FibonacciLine::new(TrendSegment::flat(start, end, below), ratio, LevelKind::Extension));
        lines.push(FibonacciLine::new(TrendSegment::flat(start, end, above), ratio, LevelKind::Extension));
    }

    lines.push(FibonacciLine::new(TrendSegment::flat(start, end, high), 0.0, LevelKind::Anchor));
    lines.push(FibonacciLine::new(TrendSegment::flat(start, end, low), 1.0, LevelKind::Anchor));
    lines
}

// ============================================================
// PARAMETERS
// ============================================================

static FIBONACCI_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("min_bars", 50.0, (20.0, 200.0), "Fewest bars before legs are searched"),
    ParamMeta::ratio("min_range", 0.005, (0.0, 0.05), "Minimum leg range relative to its high"),
    ParamMeta::period("max_sets", 8.0, (1.0, 20.0), "Most recent retracement sets kept"),
];

impl ParameterizedStudy for FibonacciConfig {
    /// Own parameters only; swing thresholds are listed by [`SwingConfig`]
    fn param_meta() -> &'static [ParamMeta] {
        FIBONACCI_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_overrides(FIBONACCI_PARAMS, params)?;
        let config = Self {
            min_bars: get_period(params, "min_bars", 50)?,
            min_range: get_ratio(params, "min_range", 0.005)?,
            max_sets: get_period(params, "max_sets", 8)?,
            swing: SwingConfig::with_params(params)?,
        };
        config.validate()?;
        Ok(config)
    }
}
