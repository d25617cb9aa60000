//! Helpers shared by the setup detectors and the signal-history engine.
//!
//! Trade levels (entry/stop/target), touch tests against a bar's range,
//! risk classification and number formatting for human-readable notes.

use serde::{Deserialize, Serialize};

use super::{RiskLevel, SetupStatus};
use crate::{Direction, Volatility, OHLCV};

// ============================================================
// RISK THRESHOLDS
// ============================================================

/// Stop distance (% of entry) below which a setup is low risk.
pub const LOW_RISK_STOP_PCT: f64 = 2.0;
/// Stop distance (% of entry) below which a setup is moderate risk.
pub const MODERATE_RISK_STOP_PCT: f64 = 5.0;

// ============================================================
// TRADE LEVELS
// ============================================================

/// Entry, stop and target of a directional setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
  pub direction: Direction,
  pub entry: f64,
  pub stop: f64,
  pub target: f64,
}

impl TradeLevels {
  /// Levels with the target projected `reward_multiple` risk units past entry.
  pub fn with_reward(direction: Direction, entry: f64, stop: f64, reward_multiple: f64) -> Self {
    Self { direction, entry, stop, target: entry + (entry - stop) * reward_multiple }
  }

  /// Absolute distance between entry and stop.
  #[inline]
  pub fn risk(&self) -> f64 {
    (self.entry - self.stop).abs()
  }

  /// Stop distance as a percentage of entry.
  #[inline]
  pub fn risk_pct(&self) -> f64 {
    pct_distance(self.entry, self.stop)
  }

  /// Status of the setup given the latest close.
  pub fn status(&self, close: f64) -> SetupStatus {
    match self.direction {
      Direction::Long if close < self.stop => SetupStatus::Invalid,
      Direction::Long if close > self.entry => SetupStatus::Active,
      Direction::Short if close > self.stop => SetupStatus::Invalid,
      Direction::Short if close < self.entry => SetupStatus::Active,
      _ => SetupStatus::Forming,
    }
  }

  #[inline]
  pub fn entry_touched<T: OHLCV>(&self, bar: &T) -> bool {
    match self.direction {
      Direction::Long => bar.high() >= self.entry,
      Direction::Short => bar.low() <= self.entry,
    }
  }

  #[inline]
  pub fn stop_touched<T: OHLCV>(&self, bar: &T) -> bool {
    match self.direction {
      Direction::Long => bar.low() <= self.stop,
      Direction::Short => bar.high() >= self.stop,
    }
  }

  #[inline]
  pub fn target_touched<T: OHLCV>(&self, bar: &T) -> bool {
    match self.direction {
      Direction::Long => bar.high() >= self.target,
      Direction::Short => bar.low() <= self.target,
    }
  }
}

// ============================================================
// HELPER FUNCTIONS
// ============================================================

/// `|a - b|` as a percentage of `a`. Zero when `a` is zero.
#[inline]
pub fn pct_distance(a: f64, b: f64) -> f64 {
  if a.abs() <= f64::EPSILON {
    return 0.0;
  }
  (a - b).abs() / a.abs() * 100.0
}

/// Risk from how far the stop sits from entry.
pub fn risk_from_stop_distance(levels: &TradeLevels) -> RiskLevel {
  match levels.risk_pct() {
    p if p < LOW_RISK_STOP_PCT => RiskLevel::Low,
    p if p < MODERATE_RISK_STOP_PCT => RiskLevel::Moderate,
    _ => RiskLevel::High,
  }
}

/// Risk implied by the market's volatility regime.
pub fn risk_from_volatility(volatility: Volatility) -> RiskLevel {
  match volatility {
    Volatility::High => RiskLevel::High,
    Volatility::Medium => RiskLevel::Moderate,
    Volatility::Low => RiskLevel::Low,
  }
}

/// Price with two decimals.
#[inline]
pub fn fmt_price(value: f64) -> String {
  format!("{value:.2}")
}
