//! Forward resolution of a triggered signal.
//!
//! Bars after the trigger are walked one at a time. On every bar the stop is
//! checked before the target, so a bar touching both resolves as a failure.
//! Touching the entry arms the signal; a signal that is still unarmed once
//! `expiry_bars` have elapsed expires. Running out of bars leaves it pending.

use serde::{Deserialize, Serialize};

use crate::{detectors::TradeLevels, OHLCV};

/// Outcome of a historical signal. Everything but `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
  Success,
  Failure,
  Pending,
  Expired,
}

impl Outcome {
  #[inline]
  pub fn is_terminal(self) -> bool {
    !matches!(self, Outcome::Pending)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Outcome::Success => "SUCCESS",
      Outcome::Failure => "FAILURE",
      Outcome::Pending => "PENDING",
      Outcome::Expired => "EXPIRED",
    }
  }
}

/// Outcome plus the bar that settled it (`None` while pending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
  pub outcome: Outcome,
  pub resolved_index: Option<usize>,
}

impl Resolution {
  const PENDING: Resolution = Resolution { outcome: Outcome::Pending, resolved_index: None };

  fn at(outcome: Outcome, index: usize) -> Self {
    Self { outcome, resolved_index: Some(index) }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
  Armed,
  Triggered,
}

/// Resolve a signal raised at `trigger_index` against the bars that follow it.
pub fn resolve_outcome<T: OHLCV>(
  bars: &[T],
  trigger_index: usize,
  levels: &TradeLevels,
  expiry_bars: usize,
) -> Resolution {
  let mut leg = Leg::Armed;

  for (index, bar) in bars.iter().enumerate().skip(trigger_index + 1) {
    if levels.stop_touched(bar) {
      return Resolution::at(Outcome::Failure, index);
    }
    if levels.target_touched(bar) {
      return Resolution::at(Outcome::Success, index);
    }
    if levels.entry_touched(bar) {
      leg = Leg::Triggered;
    }
    if leg == Leg::Armed && index - trigger_index >= expiry_bars {
      return Resolution::at(Outcome::Expired, index);
    }
  }

  Resolution::PENDING
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Candle, Direction};

  fn bar(h: f64, l: f64) -> Candle {
    Candle::new(0, l, h, l, h, 0.0)
  }

  fn long() -> TradeLevels {
    TradeLevels::with_reward(Direction::Long, 110.0, 100.0, 1.0)
  }

  fn short() -> TradeLevels {
    TradeLevels::with_reward(Direction::Short, 90.0, 100.0, 1.0)
  }

  #[test]
  fn test_target_after_trigger() {
    let bars = [bar(105.0, 101.0), bar(111.0, 104.0), bar(120.5, 109.0)];
    let r = resolve_outcome(&bars, 0, &long(), 10);
    assert_eq!(r, Resolution::at(Outcome::Success, 2));
  }

  #[test]
  fn test_stop_wins_same_bar() {
    let bars = [bar(105.0, 101.0), bar(125.0, 95.0)];
    assert_eq!(resolve_outcome(&bars, 0, &long(), 10).outcome, Outcome::Failure);
    let bars = [bar(95.0, 91.0), bar(105.0, 75.0)];
    assert_eq!(resolve_outcome(&bars, 0, &short(), 10).outcome, Outcome::Failure);
  }

  #[test]
  fn test_stop_before_entry_fails() {
    let bars = [bar(105.0, 101.0), bar(104.0, 99.0)];
    assert_eq!(resolve_outcome(&bars, 0, &long(), 10), Resolution::at(Outcome::Failure, 1));
  }

  #[test]
  fn test_trigger_bar_is_skipped() {
    // trigger bar itself touches everything
    let bars = [bar(130.0, 90.0), bar(105.0, 101.0)];
    assert_eq!(resolve_outcome(&bars, 0, &long(), 10), Resolution::PENDING);
  }

  #[test]
  fn test_expiry_without_entry() {
    let bars: Vec<Candle> = (0..6).map(|_| bar(105.0, 101.0)).collect();
    assert_eq!(resolve_outcome(&bars, 0, &long(), 5), Resolution::at(Outcome::Expired, 5));
    assert_eq!(resolve_outcome(&bars, 0, &long(), 6).outcome, Outcome::Pending);
  }

  #[test]
  fn test_triggered_signal_does_not_expire() {
    let mut bars = vec![bar(105.0, 101.0), bar(111.0, 104.0)];
    bars.extend((0..10).map(|_| bar(112.0, 104.0)));
    assert_eq!(resolve_outcome(&bars, 0, &long(), 3).outcome, Outcome::Pending);
  }

  #[test]
  fn test_short_target() {
    let bars = [bar(95.0, 91.0), bar(92.0, 89.0), bar(88.0, 79.5)];
    assert_eq!(resolve_outcome(&bars, 0, &short(), 10), Resolution::at(Outcome::Success, 2));
  }

  #[test]
  fn test_terminal() {
    assert!(Outcome::Success.is_terminal());
    assert!(Outcome::Expired.is_terminal());
    assert!(!Outcome::Pending.is_terminal());
    assert_eq!(serde_json::to_string(&Outcome::Expired).unwrap(), "\"EXPIRED\"");
  }
}
