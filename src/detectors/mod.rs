//! Trading setup detectors
//!
//! - **Setup 123**: three-candle reversal (V / inverted-V) filtered by the
//!   EMA8/EMA80 trend and the MACD histogram.
//! - **Mystic Pulse**: DI+/DI- momentum streak classified against an external
//!   trend/volatility context.
//!
//! Each detector returns a fresh [`SetupResult`] or `None` when there is not
//! enough history or nothing to report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Direction;

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod mystic_pulse;
pub mod setup_123;

pub use helpers::*;
pub use mystic_pulse::*;
pub use setup_123::*;

impl_with_defaults!(Setup123Detector, MysticPulseDetector);

/// Lifecycle state of a setup at the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupStatus {
  /// Triggered and tradeable.
  #[serde(rename = "ATIVO")]
  Active,
  /// Pattern present, trigger not reached (or counter-trend).
  #[serde(rename = "EM_FORMACAO")]
  Forming,
  #[serde(rename = "INVALIDO")]
  Invalid,
}

impl SetupStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      SetupStatus::Active => "ATIVO",
      SetupStatus::Forming => "EM_FORMACAO",
      SetupStatus::Invalid => "INVALIDO",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
  #[serde(rename = "Baixo")]
  Low,
  #[serde(rename = "Moderado")]
  Moderate,
  #[serde(rename = "Alto")]
  High,
}

impl RiskLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      RiskLevel::Low => "Baixo",
      RiskLevel::Moderate => "Moderado",
      RiskLevel::High => "Alto",
    }
  }
}

/// Point-in-time detection result. Built fresh on every call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupResult {
  pub id: String,
  pub title: String,
  pub status: SetupStatus,
  pub direction: Direction,
  /// Historical hit rate in percent (0..=100).
  pub success_rate: f64,
  pub risk: RiskLevel,
  pub stop_suggestion: String,
  pub target_note: String,
  pub explanation: String,
  pub signals: Vec<String>,
  pub meta: BTreeMap<String, f64>,
}

impl SetupResult {
  /// Numeric metadata lookup.
  pub fn meta_value(&self, key: &str) -> Option<f64> {
    self.meta.get(key).copied()
  }
}
