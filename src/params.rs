//! Tunable parameters of the setup detectors and the history engine
//!
//! Every parameterised type publishes its knobs as [`ParamMeta`] (name, type,
//! default, search range) so callers can build a detector from a plain
//! `HashMap<&str, f64>` or sweep a grid when calibrating success rates.
//!
//! # Example
//!
//! ```rust
//! use setupscan::params::ParameterizedDetector;
//! use setupscan::prelude::*;
//!
//! for param in Setup123Detector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{Period, Ratio, Result, SetupError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value in `0.0..=1.0`
  Ratio,
  /// Period value (positive integer)
  Period,
  /// Non-negative integer count
  Count,
  /// Finite, strictly positive real
  Positive,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "ema_slow")
  pub name: &'static str,
  /// Parameter type (Ratio or Period)
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a Ratio parameter
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  /// Create a new ParamMeta for a Period parameter
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Create a new ParamMeta for a Count parameter
  pub const fn count(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Count, default, range, description }
  }

  /// Create a new ParamMeta for a strictly positive real parameter
  pub const fn positive(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Positive, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if !value.is_finite() {
      return Err(SetupError::InvalidValue("parameter must be finite"));
    }
    if value < min || value > max {
      return Err(SetupError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(SetupError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
      ParamType::Count => check_count(value).map(|_| ()),
      ParamType::Positive => {
        if value <= 0.0 {
          return Err(SetupError::InvalidValue("parameter must be positive"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Detectors (and the history engine) that can be built from named numbers
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  /// Identifier of the setup this type detects
  fn setup_id_str() -> &'static str;

  /// Check every supplied value that has metadata against its type and range.
  ///
  /// Keys without metadata are left to `with_params`.
  fn validate_params(params: &HashMap<&str, f64>) -> Result<()> {
    for meta in Self::param_meta() {
      if let Some(&value) = params.get(meta.name) {
        meta.validate(value)?;
      }
    }
    Ok(())
  }

  /// Every combination of the grid values of `param_meta()`.
  fn grid() -> Vec<HashMap<&'static str, f64>> {
    Self::param_meta().iter().fold(vec![HashMap::new()], |combos, meta| {
      combos
        .into_iter()
        .flat_map(|combo| {
          meta.generate_grid().into_iter().map(move |value| {
            let mut next = combo.clone();
            next.insert(meta.name, value);
            next
          })
        })
        .collect()
    })
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
///
/// Fractional, negative and non-finite values are rejected rather than truncated.
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  match params.get(key) {
    Some(&value) => {
      if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
        return Err(SetupError::InvalidValue("Period must be a positive integer"));
      }
      Period::new(value as usize)
    },
    None => Period::new(default),
  }
}

/// Helper to get a non-negative integer count from params with default fallback
pub fn get_count(params: &HashMap<&str, f64>, key: &str, default: u32) -> Result<u32> {
  params.get(key).map_or(Ok(default), |&value| check_count(value))
}

fn check_count(value: f64) -> Result<u32> {
  if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
    return Err(SetupError::InvalidValue("count must be a non-negative integer"));
  }
  Ok(value as u32)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_meta_ratio() {
    let meta = ParamMeta::ratio("test_ratio", 0.5, (0.3, 0.7, 0.1), "Test ratio parameter");

    assert_eq!(meta.name, "test_ratio");
    assert_eq!(meta.param_type, ParamType::Ratio);
    assert_eq!(meta.default, 0.5);
  }

  #[test]
  fn test_param_meta_period() {
    let meta = ParamMeta::period("test_period", 14.0, (10.0, 20.0, 2.0), "Test period parameter");

    assert_eq!(meta.name, "test_period");
    assert_eq!(meta.param_type, ParamType::Period);
    assert_eq!(meta.default, 14.0);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.2), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 3);
    assert!((grid[0] - 0.3).abs() < f64::EPSILON);
    assert!((grid[1] - 0.5).abs() < f64::EPSILON);
    assert!((grid[2] - 0.7).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validate_ratio() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.1), "Test");

    assert!(meta.validate(0.5).is_ok());
    assert!(meta.validate(0.3).is_ok());
    assert!(meta.validate(0.7).is_ok());
    assert!(meta.validate(0.2).is_err());
    assert!(meta.validate(0.8).is_err());
  }

  #[test]
  fn test_validate_period() {
    let meta = ParamMeta::period("test", 14.0, (10.0, 20.0, 2.0), "Test");

    assert!(meta.validate(14.0).is_ok());
    assert!(meta.validate(10.0).is_ok());
    assert!(meta.validate(20.0).is_ok());
    assert!(meta.validate(8.0).is_err());
    assert!(meta.validate(22.0).is_err());
  }

  #[test]
  fn test_validate_ratio_bounds() {
    let meta = ParamMeta::ratio("test", 0.5, (0.0, 2.0, 0.5), "Test");
    assert!(meta.validate(1.0).is_ok());
    assert!(meta.validate(1.5).is_err());
  }

  #[test]
  fn test_validate_period_fraction() {
    let meta = ParamMeta::period("test", 14.0, (10.0, 20.0, 2.0), "Test");
    assert!(meta.validate(14.5).is_err());
  }

  #[test]
  fn test_get_ratio_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 0.8);

    assert!((get_ratio(&params, "key1", 0.5).unwrap().get() - 0.8).abs() < f64::EPSILON);
    assert!((get_ratio(&params, "key2", 0.5).unwrap().get() - 0.5).abs() < f64::EPSILON);
  }

  #[test]
  fn test_get_period_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 20.0);

    assert_eq!(get_period(&params, "key1", 14).unwrap().get(), 20);
    assert_eq!(get_period(&params, "key2", 14).unwrap().get(), 14);
  }

  #[test]
  fn test_get_period_rejects_fraction() {
    let mut params = HashMap::new();
    params.insert("key1", 14.7);
    assert!(get_period(&params, "key1", 14).is_err());

    params.insert("key1", -3.0);
    assert!(get_period(&params, "key1", 14).is_err());

    params.insert("key1", f64::NAN);
    assert!(get_period(&params, "key1", 14).is_err());
  }

  #[test]
  fn test_get_count_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 7.0);
    assert_eq!(get_count(&params, "key1", 5).unwrap(), 7);
    assert_eq!(get_count(&params, "key2", 5).unwrap(), 5);

    for bad in [-1.0, 2.5, f64::NAN, f64::INFINITY] {
      params.insert("key1", bad);
      assert!(get_count(&params, "key1", 5).is_err());
    }
  }

  #[test]
  fn test_validate_positive_and_count() {
    let positive = ParamMeta::positive("test", 1.0, (0.0, 3.0, 0.5), "Test");
    assert!(positive.validate(1.5).is_ok());
    assert!(positive.validate(0.0).is_err());
    assert!(positive.validate(f64::NAN).is_err());

    let count = ParamMeta::count("test", 5.0, (0.0, 10.0, 1.0), "Test");
    assert!(count.validate(0.0).is_ok());
    assert!(count.validate(4.5).is_err());
  }
}
