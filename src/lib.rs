//! # trendkit
//!
//! Indicators and geometric trend lines over daily OHLC bars.
//!
//! - [`indicators`]: SMA, EMA, RSI, MACD and the detrended price oscillator
//! - [`trend`]: convex-hull support/resistance and Fibonacci swing retracements
//! - [`series`]: ratio series of two tickers and percent returns
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use trendkit::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let bars: Vec<Bar> = (0..60u64)
//!     .map(|i| {
//!         let p = 100.0 + (i as f64 / 5.0).sin() * 10.0;
//!         Bar::new(start + chrono::Days::new(i), p, p + 1.0, p - 1.0, p)
//!     })
//!     .collect();
//!
//! let engine = EngineBuilder::new()
//!     .with_indicator_defaults()
//!     .with_trend_defaults()
//!     .validate_data(true)
//!     .build()
//!     .unwrap();
//!
//! let report = engine.run(&bars).unwrap();
//! assert_eq!(report.bar_count, 60);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod indicators;
pub mod params;
pub mod request;
pub mod series;
pub mod table;
pub mod trend;

use indicators::{IndicatorPoint, MacdPoint};
use request::{IndicatorKind, Pane, StudyRequest};
use trend::{FibonacciConfig, FibonacciLine, FibonacciSet, HullConfig, HullLines};

pub mod prelude {
    pub use crate::{
        // Parallel
        analyze_parallel,
        // Indicators
        indicators::{detrended_price_oscillator, ema, macd, rsi, sma, IndicatorPoint, MacdPoint},
        // Parameters
        params::{ParamMeta, ParamType, ParameterizedStudy},
        // Requests
        request::{IndicatorKind, Pane, StudyRequest},
        // Series
        series::{percent_returns, ratio_series, RatioSymbol},
        // Trend lines
        trend::{
            extend_line, fibonacci_lines, fibonacci_sets, find_swings, horizontal_line, hull_lines,
            retracement_lines, DatedPrice, FibonacciConfig, FibonacciLine, FibonacciSet, HullConfig,
            HullLines, LevelKind, SwingConfig, SwingPoint, TrendSegment,
        },
        AnalysisEngine,
        // Errors
        AnalysisError,
        AnalysisFailure,
        AnalysisResult,
        Bar,
        EngineBuilder,
        // Core traits
        Ohlc,
        OhlcExt,
        Period,
        Ratio,
        Report,
        Result,
        Study,
        StudyOutput,
        StudyReport,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised for parameter misuse or malformed input.
///
/// Short histories are never an error; operations return empty output instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLC at index {index}: {reason}")]
    InvalidOhlc { index: usize, reason: &'static str },

    #[error("Date at index {index} is not after the previous bar")]
    UnorderedDates { index: usize },

    #[error("Invalid ratio symbol '{0}': expected NUMERATOR/DENOMINATOR")]
    InvalidRatioSymbol(String),

    #[error("Unsupported indicator: {0}")]
    UnsupportedIndicator(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// One trading day
pub trait Ohlc {
    fn date(&self) -> NaiveDate;
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

impl<T: Ohlc + ?Sized> Ohlc for &T {
    fn date(&self) -> NaiveDate {
        (**self).date()
    }

    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }
}

/// Extension trait with bar sanity checks
pub trait OhlcExt: Ohlc {
    /// Check values are finite and `high >= low`
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(AnalysisError::InvalidOhlc { index: 0, reason: "NaN in OHLC" });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(AnalysisError::InvalidOhlc { index: 0, reason: "Infinite value in OHLC" });
        }
        if self.high() < self.low() {
            return Err(AnalysisError::InvalidOhlc { index: 0, reason: "high < low" });
        }
        Ok(())
    }
}

impl<T: Ohlc + ?Sized> OhlcExt for T {}

/// Owned daily bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { date, open, high, low, close }
    }
}

impl Ohlc for Bar {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

// ============================================================
// STUDIES
// ============================================================

/// One configured computation over a bar series
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Study {
    Sma(Period),
    Ema(Period),
    Rsi(Period),
    Macd { fast: Period, slow: Period, signal: Period },
    Dpo(Period),
    Hull(HullConfig),
    Fibonacci(FibonacciConfig),
}

impl Study {
    /// MACD with the 12/26/9 defaults
    pub fn default_macd() -> Self {
        Study::Macd {
            fast: Period::new_const(indicators::DEFAULT_MACD_FAST),
            slow: Period::new_const(indicators::DEFAULT_MACD_SLOW),
            signal: Period::new_const(indicators::DEFAULT_MACD_SIGNAL),
        }
    }

    /// Short name with parameters, e.g. `SMA(20)` or `MACD(12,26,9)`
    pub fn label(&self) -> String {
        match self {
            Study::Sma(p) => format!("SMA({})", p.get()),
            Study::Ema(p) => format!("EMA({})", p.get()),
            Study::Rsi(p) => format!("RSI({})", p.get()),
            Study::Dpo(p) => format!("DPO({})", p.get()),
            Study::Macd { fast, slow, signal } => {
                format!("MACD({},{},{})", fast.get(), slow.get(), signal.get())
            },
            Study::Hull(_) => "HULL".to_string(),
            Study::Fibonacci(_) => "FIBONACCI".to_string(),
        }
    }

    /// Oscillators go below price, everything else on top of it
    pub fn default_display(&self) -> Pane {
        match self {
            Study::Rsi(_) | Study::Macd { .. } | Study::Dpo(_) => Pane::Panel,
            _ => Pane::Overlay,
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        match self {
            Study::Macd { fast, slow, .. } if fast >= slow => Err(AnalysisError::InvalidConfig(format!(
                "MACD fast period {} must be shorter than slow period {}",
                fast.get(),
                slow.get()
            ))),
            Study::Fibonacci(config) => config.validate(),
            _ => Ok(()),
        }
    }

    pub fn run<T: Ohlc>(&self, bars: &[T]) -> StudyOutput {
        match *self {
            Study::Sma(p) => StudyOutput::Series(indicators::sma(bars, p.get())),
            Study::Ema(p) => StudyOutput::Series(indicators::ema(bars, p.get())),
            Study::Rsi(p) => StudyOutput::Series(indicators::rsi(bars, p.get())),
            Study::Dpo(p) => StudyOutput::Series(indicators::detrended_price_oscillator(bars, p.get())),
            Study::Macd { fast, slow, signal } => {
                StudyOutput::Macd(indicators::macd(bars, fast.get(), slow.get(), signal.get()))
            },
            Study::Hull(ref config) => StudyOutput::Hull(trend::hull_lines(bars, config)),
            Study::Fibonacci(ref config) => {
                let sets = trend::fibonacci_sets(bars, config);
                let lines = match bars.last() {
                    Some(last) => trend::set_lines(&sets, last.date()),
                    None => Vec::new(),
                };
                StudyOutput::Fibonacci { sets, lines }
            },
        }
    }
}

impl From<StudyRequest> for Study {
    /// A MACD request sets the fast period; slow and signal keep their defaults
    fn from(req: StudyRequest) -> Self {
        match req.kind {
            IndicatorKind::Sma => Study::Sma(req.period),
            IndicatorKind::Ema => Study::Ema(req.period),
            IndicatorKind::Rsi => Study::Rsi(req.period),
            IndicatorKind::Dpo => Study::Dpo(req.period),
            IndicatorKind::Macd => Study::Macd {
                fast: req.period,
                slow: Period::new_const(indicators::DEFAULT_MACD_SLOW),
                signal: Period::new_const(indicators::DEFAULT_MACD_SIGNAL),
            },
        }
    }
}

/// What a study produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyOutput {
    Series(Vec<IndicatorPoint>),
    Macd(Vec<MacdPoint>),
    Hull(HullLines),
    Fibonacci { sets: Vec<FibonacciSet>, lines: Vec<FibonacciLine> },
}

impl StudyOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            StudyOutput::Series(points) => points.is_empty(),
            StudyOutput::Macd(points) => points.is_empty(),
            StudyOutput::Hull(lines) => lines.is_empty(),
            StudyOutput::Fibonacci { sets, .. } => sets.is_empty(),
        }
    }
}

/// One study's output with its rendering hint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyReport {
    pub label: String,
    pub display: Pane,
    pub output: StudyOutput,
}

/// Everything one engine run produced, in study order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub bar_count: usize,
    pub studies: Vec<StudyReport>,
}

impl Report {
    /// First output whose label matches
    pub fn get(&self, label: &str) -> Option<&StudyOutput> {
        self.studies.iter().find(|s| s.label == label).map(|s| &s.output)
    }
}

// ============================================================
// ANALYSIS ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub validate_data: bool,
}

/// Runs a fixed list of studies over bar series
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    studies: Vec<(Study, Pane)>,
    config: EngineConfig,
}

impl AnalysisEngine {
    pub fn studies(&self) -> impl Iterator<Item = &Study> {
        self.studies.iter().map(|(s, _)| s)
    }

    /// Run every study over `bars`.
    ///
    /// Fails only when data validation is enabled and a bar is malformed.
    pub fn run<T: Ohlc>(&self, bars: &[T]) -> Result<Report> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        let studies: Vec<StudyReport> = self
            .studies
            .iter()
            .map(|(study, display)| StudyReport {
                label: study.label(),
                display: *display,
                output: study.run(bars),
            })
            .collect();

        debug!(
            bars = bars.len(),
            studies = studies.len(),
            empty = studies.iter().filter(|s| s.output.is_empty()).count(),
            "analysis run complete"
        );

        Ok(Report { bar_count: bars.len(), studies })
    }

    fn validate(&self) -> Result<()> {
        for (study, _) in &self.studies {
            study.validate_config()?;
        }
        Ok(())
    }
}

/// Check every bar and the strict date order
pub fn validate_bars<T: Ohlc>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            AnalysisError::InvalidOhlc { reason, .. } => AnalysisError::InvalidOhlc { index: i, reason },
            other => other,
        })?;
    }
    if let Some(i) = bars.windows(2).position(|w| w[1].date() <= w[0].date()) {
        return Err(AnalysisError::UnorderedDates { index: i + 1 });
    }
    Ok(())
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating AnalysisEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    studies: Vec<(Study, Pane)>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// SMA(20), EMA(20), RSI(14), MACD(12,26,9) and DPO(20)
    pub fn with_indicator_defaults(self) -> Self {
        let avg = Period::new_const(indicators::DEFAULT_AVERAGE_PERIOD);
        self.add(Study::Sma(avg))
            .add(Study::Ema(avg))
            .add(Study::Rsi(Period::new_const(indicators::DEFAULT_RSI_PERIOD)))
            .add(Study::default_macd())
            .add(Study::Dpo(avg))
    }

    /// Hull trend lines and Fibonacci sets with default thresholds
    pub fn with_trend_defaults(self) -> Self {
        self.add(Study::Hull(HullConfig::default()))
            .add(Study::Fibonacci(FibonacciConfig::default()))
    }

    /// Add a study drawn at its default place
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, study: Study) -> Self {
        let display = study.default_display();
        self.add_with_display(study, display)
    }

    pub fn add_with_display(mut self, study: Study, display: Pane) -> Self {
        self.studies.push((study, display));
        self
    }

    /// Add with config validation
    pub fn add_checked(self, study: Study) -> Result<Self> {
        study.validate_config()?;
        Ok(self.add(study))
    }

    /// Add a parsed descriptor, keeping its display choice
    pub fn add_request(self, request: StudyRequest) -> Self {
        self.add_with_display(Study::from(request), request.display)
    }

    /// Add every descriptor of a `TYPE:PERIOD:DISPLAY,...` list
    pub fn with_requests(self, list: &str) -> Result<Self> {
        let requests = StudyRequest::parse_list(list)?;
        Ok(requests.into_iter().fold(self, Self::add_request))
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<AnalysisEngine> {
        let engine = AnalysisEngine { studies: self.studies, config: self.config };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

use rayon::prelude::*;

/// Report for a single ticker
#[derive(Debug)]
pub struct AnalysisResult {
    pub symbol: String,
    pub report: Report,
}

/// Error from analysing a single ticker
#[derive(Debug)]
pub struct AnalysisFailure {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Run one engine over many tickers in parallel
pub fn analyze_parallel<'a, T, I>(engine: &AnalysisEngine, instruments: I) -> (Vec<AnalysisResult>, Vec<AnalysisFailure>)
where
    T: Ohlc + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .run(bars)
                .map(|report| AnalysisResult { symbol: symbol.to_string(), report })
                .map_err(|error| AnalysisFailure { symbol: symbol.to_string(), error })
        })
        .collect();

    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => failures.push(e),
        }
    }

    (successes, failures)
}

// ============================================================
// TESTS
// ============================================================
