//! Outcome tallies. Always derived from a signal set, never stored on their own.

use serde::{Deserialize, Serialize};

use super::{HistoricalSignal, Outcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalStats {
  pub success: usize,
  pub failure: usize,
  pub pending: usize,
  pub expired: usize,
  /// `success / (success + failure) * 100`, zero without resolved trades.
  pub success_rate: f64,
}

impl SignalStats {
  pub fn tally(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
    let mut stats = outcomes.into_iter().fold(Self::default(), |mut stats, outcome| {
      match outcome {
        Outcome::Success => stats.success += 1,
        Outcome::Failure => stats.failure += 1,
        Outcome::Pending => stats.pending += 1,
        Outcome::Expired => stats.expired += 1,
      }
      stats
    });
    stats.success_rate = success_rate(stats.success, stats.failure);
    stats
  }

  #[inline]
  pub fn total(&self) -> usize {
    self.success + self.failure + self.pending + self.expired
  }

  /// Signals that hit either the target or the stop.
  #[inline]
  pub fn decided(&self) -> usize {
    self.success + self.failure
  }
}

impl FromIterator<Outcome> for SignalStats {
  fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
    Self::tally(iter)
  }
}

/// Tally the outcomes of `signals`.
pub fn calculate_signal_stats(signals: &[HistoricalSignal]) -> SignalStats {
  signals.iter().map(|s| s.outcome).collect()
}

#[inline]
fn success_rate(success: usize, failure: usize) -> f64 {
  let decided = success + failure;
  if decided == 0 {
    return 0.0;
  }
  success as f64 / decided as f64 * 100.0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tally() {
    let stats = SignalStats::tally([
      Outcome::Success,
      Outcome::Success,
      Outcome::Success,
      Outcome::Failure,
      Outcome::Pending,
      Outcome::Expired,
      Outcome::Expired,
    ]);
    assert_eq!(stats.success, 3);
    assert_eq!(stats.failure, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.expired, 2);
    assert_eq!(stats.total(), 7);
    assert_eq!(stats.decided(), 4);
    assert_eq!(stats.success_rate, 75.0);
  }

  #[test]
  fn test_zero_guard() {
    let empty = calculate_signal_stats(&[]);
    assert_eq!(empty, SignalStats::default());

    let undecided = SignalStats::tally([Outcome::Pending, Outcome::Expired]);
    assert_eq!(undecided.success_rate, 0.0);
  }

  #[test]
  fn test_wire_shape() {
    let json = serde_json::to_value(SignalStats::tally([Outcome::Success])).unwrap();
    assert_eq!(json["successRate"], 100.0);
    assert_eq!(json["expired"], 0);
  }
}
