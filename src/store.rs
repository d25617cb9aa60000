//! Seams to the collaborators around the analysis core
//!
//! - [`CandleSource`]: where candles come from (`None` or empty means no data).
//! - [`SignalStore`]: where historical signals are kept.
//! - [`HistoryJob`]: loads candles, runs the backtest and replaces each
//!   ticker's stored signals, one ticker at a time.
//!
//! The in-memory implementations back tests and small tools.

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::{
  history::{HistoricalSignal, SignalHistory, SignalStats},
  Candle, Result, OHLCV,
};

// ============================================================
// CANDLE SOURCE
// ============================================================

pub trait CandleSource {
  type Candle: OHLCV + Sync;

  /// Up to `limit` most recent candles, time-ascending.
  fn candles(&self, ticker: &str, limit: usize, timeframe: &str) -> Option<Vec<Self::Candle>>;
}

/// Candle series keyed by `(ticker, timeframe)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCandleSource {
  series: HashMap<(String, String), Vec<Candle>>,
}

impl InMemoryCandleSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, ticker: &str, timeframe: &str, candles: Vec<Candle>) {
    self.series.insert((ticker.to_string(), timeframe.to_string()), candles);
  }
}

impl CandleSource for InMemoryCandleSource {
  type Candle = Candle;

  fn candles(&self, ticker: &str, limit: usize, timeframe: &str) -> Option<Vec<Candle>> {
    let series = self.series.get(&(ticker.to_string(), timeframe.to_string()))?;
    let start = series.len().saturating_sub(limit);
    Some(series[start..].to_vec())
  }
}

// ============================================================
// SIGNAL STORE
// ============================================================

pub trait SignalStore {
  /// Insert or replace signals by `(ticker, timeframe, trigger_index)`. Returns how many were written.
  fn upsert_signals(&mut self, signals: &[HistoricalSignal]) -> Result<usize>;

  /// Remove every signal of `ticker`, across all timeframes. Returns how many were removed.
  fn delete_signals_by_ticker(&mut self, ticker: &str) -> Result<usize>;

  /// Remove the signals of `ticker` on one timeframe. Returns how many were removed.
  fn delete_signals(&mut self, ticker: &str, timeframe: &str) -> Result<usize>;

  fn signal_stats(&self, ticker: &str) -> Result<SignalStats>;

  fn count_all_signals(&self) -> Result<usize>;
}

type SignalKey = (String, String, usize);

#[derive(Debug, Clone, Default)]
pub struct InMemorySignalStore {
  signals: BTreeMap<SignalKey, HistoricalSignal>,
}

impl InMemorySignalStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stored signals of `ticker`, ordered by timeframe then trigger index.
  pub fn signals_for<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a HistoricalSignal> + 'a {
    self.signals.values().filter(move |s| s.ticker == ticker)
  }
}

impl SignalStore for InMemorySignalStore {
  fn upsert_signals(&mut self, signals: &[HistoricalSignal]) -> Result<usize> {
    for signal in signals {
      let key = (signal.ticker.clone(), signal.timeframe.clone(), signal.trigger_index);
      self.signals.insert(key, signal.clone());
    }
    Ok(signals.len())
  }

  fn delete_signals_by_ticker(&mut self, ticker: &str) -> Result<usize> {
    let before = self.signals.len();
    self.signals.retain(|(t, _, _), _| t != ticker);
    Ok(before - self.signals.len())
  }

  fn delete_signals(&mut self, ticker: &str, timeframe: &str) -> Result<usize> {
    let before = self.signals.len();
    self.signals.retain(|(t, tf, _), _| t != ticker || tf != timeframe);
    Ok(before - self.signals.len())
  }

  fn signal_stats(&self, ticker: &str) -> Result<SignalStats> {
    Ok(self.signals_for(ticker).map(|s| s.outcome).collect())
  }

  fn count_all_signals(&self) -> Result<usize> {
    Ok(self.signals.len())
  }
}

// ============================================================
// HISTORY JOB
// ============================================================

/// Result of one ticker in a history job
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReport {
  pub ticker: String,
  pub signals: usize,
  pub stats: SignalStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobReport {
  pub processed: Vec<TickerReport>,
  /// Tickers the candle source had no data for.
  pub skipped: Vec<String>,
}

impl JobReport {
  pub fn total_signals(&self) -> usize {
    self.processed.iter().map(|r| r.signals).sum()
  }
}

/// Rebuilds the stored signal history of a list of tickers on one timeframe.
///
/// Signals stored for other timeframes are left untouched.
#[derive(Debug, Clone)]
pub struct HistoryJob {
  pub history: SignalHistory,
  pub timeframe: String,
  /// Candles requested per ticker.
  pub limit: usize,
}

impl Default for HistoryJob {
  fn default() -> Self {
    Self { history: SignalHistory::default(), timeframe: "1d".to_string(), limit: 1000 }
  }
}

impl HistoryJob {
  pub fn new(history: SignalHistory, timeframe: impl Into<String>, limit: usize) -> Self {
    Self { history, timeframe: timeframe.into(), limit }
  }

  /// Run the job; the first store error aborts it.
  pub fn run<C, S>(&self, source: &C, store: &mut S, tickers: &[&str]) -> Result<JobReport>
  where
    C: CandleSource,
    S: SignalStore,
  {
    self.history.validate_config()?;
    let mut report = JobReport::default();

    for &ticker in tickers {
      let candles = match source.candles(ticker, self.limit, &self.timeframe) {
        Some(candles) if !candles.is_empty() => candles,
        _ => {
          warn!(%ticker, timeframe = %self.timeframe, "history job: no candles");
          report.skipped.push(ticker.to_string());
          continue;
        },
      };

      let signals = self.history.run(ticker, &self.timeframe, &candles);
      store.delete_signals(ticker, &self.timeframe)?;
      let written = store.upsert_signals(&signals)?;
      let stats: SignalStats = signals.iter().map(|s| s.outcome).collect();

      info!(
        %ticker,
        timeframe = %self.timeframe,
        candles = candles.len(),
        signals = written,
        success = stats.success,
        failure = stats.failure,
        pending = stats.pending,
        expired = stats.expired,
        success_rate = stats.success_rate,
        "history job: ticker done"
      );
      report.processed.push(TickerReport { ticker: ticker.to_string(), signals: written, stats });
    }

    info!(
      processed = report.processed.len(),
      skipped = report.skipped.len(),
      signals = report.total_signals(),
      "history job: finished"
    );
    Ok(report)
  }
}
