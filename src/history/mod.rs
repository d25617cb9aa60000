//! Walk-forward signal history for Setup 123
//!
//! Every bar from the first one the live detector could run on is treated as
//! a candidate P3. A bar completing a 123 pattern raises one signal with the
//! live detector's entry/stop/target, which is then resolved against the bars
//! that follow it (see [`resolve_outcome`]).
//!
//! Candidate bars are independent reads of the same candle slice, so they are
//! evaluated in parallel; the collected signals keep bar order.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
  detectors::{pattern_123_at, PatternType, Setup123Detector, Setup123Series},
  params::{get_period, ParamMeta, ParameterizedDetector},
  Period, Result, SetupDetector, SetupId, OHLCV,
};

pub mod resolve;
pub mod stats;

pub use resolve::{resolve_outcome, Outcome, Resolution};
pub use stats::{calculate_signal_stats, SignalStats};

/// One historical Setup 123 trigger and how it played out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSignal {
  pub ticker: String,
  pub timeframe: String,
  /// Index of the P3 bar.
  pub trigger_index: usize,
  pub trigger_time: Option<i64>,
  pub direction: PatternType,
  pub entry_price: f64,
  pub stop_price: f64,
  pub target_price: f64,
  pub outcome: Outcome,
  pub resolved_index: Option<usize>,
  pub resolved_time: Option<i64>,
}

/// Backtest configuration: the live detector plus the entry expiry horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalHistory {
  pub detector: Setup123Detector,
  /// Bars after the trigger within which the entry must be touched.
  pub expiry_bars: Period,
}

impl Default for SignalHistory {
  fn default() -> Self {
    Self { detector: Setup123Detector::default(), expiry_bars: Period::new_const(10) }
  }
}

impl SignalHistory {
  pub fn new(detector: Setup123Detector, expiry_bars: Period) -> Self {
    Self { detector, expiry_bars }
  }

  pub fn validate_config(&self) -> Result<()> {
    self.detector.validate_config()
  }

  /// All signals for `ticker`, oldest trigger first. Empty with too little history.
  pub fn run<T: OHLCV + Sync>(
    &self,
    ticker: &str,
    timeframe: &str,
    bars: &[T],
  ) -> Vec<HistoricalSignal> {
    let min_candles = self.detector.min_candles.get();
    if bars.len() < min_candles {
      debug!(%ticker, bars = bars.len(), need = min_candles, "history: not enough candles");
      return Vec::new();
    }

    let series = match Setup123Series::compute(&self.detector, bars) {
      Ok(series) => series,
      Err(error) => {
        warn!(%ticker, %error, "history: invalid detector configuration");
        return Vec::new();
      },
    };

    let expiry = self.expiry_bars.get();
    let signals: Vec<HistoricalSignal> = (min_candles - 1..bars.len())
      .into_par_iter()
      .filter_map(|i| {
        let pattern = [PatternType::Buy, PatternType::Sell]
          .into_iter()
          .find_map(|kind| pattern_123_at(bars, &series, i, kind))?;
        let levels = pattern.levels(bars)?;
        let resolution = resolve_outcome(bars, i, &levels, expiry);

        debug!(
          %ticker,
          trigger = i,
          kind = pattern.pattern_type.as_str(),
          outcome = resolution.outcome.as_str(),
          "history: signal resolved"
        );

        Some(HistoricalSignal {
          ticker: ticker.to_string(),
          timeframe: timeframe.to_string(),
          trigger_index: i,
          trigger_time: bars[i].timestamp(),
          direction: pattern.pattern_type,
          entry_price: levels.entry,
          stop_price: levels.stop,
          target_price: levels.target,
          outcome: resolution.outcome,
          resolved_index: resolution.resolved_index,
          resolved_time: resolution.resolved_index.and_then(|j| bars[j].timestamp()),
        })
      })
      .collect();

    debug!(%ticker, %timeframe, signals = signals.len(), "history: scan complete");
    signals
  }
}

/// Signal history with the default Setup 123 configuration.
pub fn detect_all_setup_123<T: OHLCV + Sync>(
  ticker: &str,
  candles: &[T],
  timeframe: &str,
) -> Vec<HistoricalSignal> {
  SignalHistory::default().run(ticker, timeframe, candles)
}

impl ParameterizedDetector for SignalHistory {
  fn param_meta() -> &'static [ParamMeta] {
    static META: [ParamMeta; 4] = [
      ParamMeta::period("ema_fast", 8.0, (5.0, 21.0, 1.0), "Fast EMA defining the local trend"),
      ParamMeta::period("ema_slow", 80.0, (50.0, 200.0, 10.0), "Slow EMA defining the local trend"),
      ParamMeta::period("min_candles", 80.0, (50.0, 200.0, 10.0), "First bar evaluated as P3"),
      ParamMeta::period("expiry_bars", 10.0, (5.0, 30.0, 5.0), "Bars allowed to reach the entry"),
    ];
    &META
  }

  /// Detector keys are forwarded to [`Setup123Detector::with_params`].
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    Self::validate_params(params)?;
    Ok(Self {
      detector: Setup123Detector::with_params(params)?,
      expiry_bars: get_period(params, "expiry_bars", 10)?,
    })
  }

  fn setup_id_str() -> &'static str {
    SetupId::SETUP_123.as_str()
  }
}
