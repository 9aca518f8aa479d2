//! Derived bar series: ratio of two tickers and percent returns

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorPoint;
use crate::{AnalysisError, Bar, Ohlc};

/// `NUMERATOR/DENOMINATOR` ticker pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatioSymbol {
    pub numerator: String,
    pub denominator: String,
}

impl RatioSymbol {
    /// True when `symbol` asks for a ratio rather than a single ticker
    pub fn is_ratio(symbol: &str) -> bool {
        symbol.contains('/')
    }
}

impl FromStr for RatioSymbol {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [num, den] if !num.is_empty() && !den.is_empty() => {
                Ok(Self { numerator: num.to_string(), denominator: den.to_string() })
            },
            _ => Err(AnalysisError::InvalidRatioSymbol(s.to_string())),
        }
    }
}

impl fmt::Display for RatioSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Field-by-field ratio of two series aligned by date.
///
/// Output follows the numerator's order. A date is dropped when the
/// denominator lacks it or has any zero OHLC field.
pub fn ratio_series<N: Ohlc, D: Ohlc>(numerator: &[N], denominator: &[D]) -> Vec<Bar> {
    let by_date: HashMap<NaiveDate, &D> = denominator.iter().map(|b| (b.date(), b)).collect();

    numerator
        .iter()
        .filter_map(|n| {
            let d = by_date.get(&n.date())?;
            if d.open() == 0.0 || d.high() == 0.0 || d.low() == 0.0 || d.close() == 0.0 {
                return None;
            }
            Some(Bar::new(
                n.date(),
                n.open() / d.open(),
                n.high() / d.high(),
                n.low() / d.low(),
                n.close() / d.close(),
            ))
        })
        .collect()
}

/// Close over previous close for every bar.
///
/// The first bar, and any bar after a zero close, reads 1.0 (no change).
pub fn percent_returns<T: Ohlc>(bars: &[T]) -> Vec<IndicatorPoint> {
    let mut prev: Option<f64> = None;
    bars.iter()
        .map(|b| {
            let value = match prev {
                Some(p) if p != 0.0 => b.close() / p,
                _ => 1.0,
            };
            prev = Some(b.close());
            IndicatorPoint { date: b.date(), value }
        })
        .collect()
}
