//! Study descriptors supplied by callers
//!
//! A descriptor list reads `TYPE[:PERIOD[:DISPLAY]]` entries separated by
//! commas, e.g. `SMA:20:overlay,RSI:14:panel,MACD`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::indicators::{DEFAULT_AVERAGE_PERIOD, DEFAULT_MACD_FAST, DEFAULT_RSI_PERIOD};
use crate::{AnalysisError, Period, Result};

/// Indicator family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Dpo,
}

impl IndicatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Dpo => "DPO",
        }
    }

    /// Lookback used when a descriptor omits or garbles the period
    pub fn default_period(self) -> usize {
        match self {
            IndicatorKind::Rsi => DEFAULT_RSI_PERIOD,
            IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Dpo => DEFAULT_AVERAGE_PERIOD,
            IndicatorKind::Macd => DEFAULT_MACD_FAST,
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" => Ok(IndicatorKind::Sma),
            "EMA" => Ok(IndicatorKind::Ema),
            "RSI" => Ok(IndicatorKind::Rsi),
            "MACD" => Ok(IndicatorKind::Macd),
            "DPO" | "DETRENDED" => Ok(IndicatorKind::Dpo),
            _ => Err(AnalysisError::UnsupportedIndicator(s.trim().to_string())),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a study is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pane {
    /// Same pane as price
    #[default]
    Overlay,
    /// Separate pane below price
    Panel,
}

/// One parsed descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRequest {
    pub kind: IndicatorKind,
    pub period: Period,
    pub display: Pane,
}

impl StudyRequest {
    pub fn new(kind: IndicatorKind, period: usize, display: Pane) -> Result<Self> {
        Ok(Self { kind, period: Period::new(period)?, display })
    }

    /// Parse a comma-separated descriptor list, skipping blank entries
    pub fn parse_list(s: &str) -> Result<Vec<Self>> {
        s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::parse::<Self>).collect()
    }
}

impl FromStr for StudyRequest {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split(':').map(str::trim);
        let kind: IndicatorKind = tokens.next().unwrap_or_default().parse()?;

        let period = tokens
            .next()
            .and_then(|t| t.parse::<i64>().ok())
            .filter(|&p| p > 0)
            .map_or(kind.default_period(), |p| p as usize);

        let display = match tokens.next() {
            Some(t) if t.eq_ignore_ascii_case("panel") => Pane::Panel,
            _ => Pane::Overlay,
        };

        Self::new(kind, period, display)
    }
}
