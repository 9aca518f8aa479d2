//! Parameter metadata for tunable studies
//!
//! The swing, hull and Fibonacci thresholds were picked by eye on daily
//! charts. This module exposes them so callers can:
//! - list what each study accepts
//! - override any subset from a plain map, each value checked against its
//!   declared range
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use trendkit::params::ParameterizedStudy;
//! use trendkit::trend::SwingConfig;
//!
//! for param in SwingConfig::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let mut params = HashMap::new();
//! params.insert("hold_window", 5.0);
//! let config = SwingConfig::with_params(&params).unwrap();
//! assert_eq!(config.hold_window.get(), 5);
//! ```

use std::collections::HashMap;

use crate::{AnalysisError, Period, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Fraction in 0.0..=1.0
  Ratio,
  /// Bar count (positive integer)
  Period,
}

/// Metadata for a single study parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "hold_window")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Accepted values: (min, max), inclusive
  pub range: (f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Check a value against the declared range and the parameter type
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max) = self.range;
    if value.is_nan() || value < min || value > max {
      return Err(AnalysisError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(AnalysisError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED STUDY TRAIT
// ============================================================

/// Configs whose thresholds can be discovered and overridden at runtime
pub trait ParameterizedStudy: Sized {
  /// Metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Build a config from a map of overrides.
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Validate every supplied value that `meta` declares.
///
/// Keys `meta` does not know are left alone: a study may pass the same map on
/// to a nested config.
pub fn check_overrides(meta: &[ParamMeta], params: &HashMap<&str, f64>) -> Result<()> {
  for param in meta {
    if let Some(&value) = params.get(param.name) {
      param.validate(value)?;
    }
  }
  Ok(())
}

/// Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value.is_nan() || value < 1.0 || value.fract() != 0.0 {
    return Err(AnalysisError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

// ============================================================
// TESTS
// ============================================================
