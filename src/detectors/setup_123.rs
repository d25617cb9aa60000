//! Setup 123 - three consecutive candles forming a reversal point
//!
//! BUY: P2 makes a lower low than P1, P3 a higher low than P2, with EMA8 above
//! EMA80 and a positive MACD histogram at P3. SELL is the mirror on highs.
//! Entry is the breakout of P3 (high for BUY, low for SELL), the stop sits at
//! the opposite extreme of P2 and the target is a 1:1 projection.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::helpers::{fmt_price, risk_from_stop_distance, TradeLevels};
use super::{SetupResult, SetupStatus};
use crate::{
  history::SignalStats,
  indicators::{ema_of_series, Macd, MacdSeries},
  params::{get_period, ParamMeta, ParameterizedDetector},
  Direction, IndicatorSeries, MarketContext, Period, Result, SetupDetector, SetupError, SetupId,
  OHLCV,
};

// ============================================================
// PATTERN
// ============================================================

/// Side of a 123 pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatternType {
  Buy,
  Sell,
}

impl PatternType {
  #[inline]
  pub fn opposite(self) -> Self {
    match self {
      PatternType::Buy => PatternType::Sell,
      PatternType::Sell => PatternType::Buy,
    }
  }

  #[inline]
  pub fn direction(self) -> Direction {
    match self {
      PatternType::Buy => Direction::Long,
      PatternType::Sell => Direction::Short,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      PatternType::Buy => "BUY",
      PatternType::Sell => "SELL",
    }
  }
}

/// Three consecutive candles: `p2_index = p1_index + 1`, `p3_index = p2_index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern123 {
  pub p1_index: usize,
  pub p2_index: usize,
  pub p3_index: usize,
  #[serde(rename = "type")]
  pub pattern_type: PatternType,
}

impl Pattern123 {
  /// Breakout entry, P2 stop and 1:1 target, or `None` when `bars` does not
  /// reach the pattern's indices.
  pub fn levels<T: OHLCV>(&self, bars: &[T]) -> Option<TradeLevels> {
    let p2 = bars.get(self.p2_index)?;
    let p3 = bars.get(self.p3_index)?;
    let (entry, stop) = match self.pattern_type {
      PatternType::Buy => (p3.high(), p2.low()),
      PatternType::Sell => (p3.low(), p2.high()),
    };
    Some(TradeLevels::with_reward(self.pattern_type.direction(), entry, stop, 1.0))
  }
}

/// EMA and MACD series the 123 rules read from, computed once per call.
#[derive(Debug, Clone)]
pub struct Setup123Series {
  pub ema_fast: IndicatorSeries,
  pub ema_slow: IndicatorSeries,
  pub macd: MacdSeries,
}

impl Setup123Series {
  pub fn compute<T: OHLCV>(detector: &Setup123Detector, bars: &[T]) -> Result<Self> {
    let closes = crate::indicators::closes(bars);
    let macd = Macd::new(detector.macd_fast, detector.macd_slow, detector.macd_signal)?;
    Ok(Self {
      ema_fast: ema_of_series(&closes, detector.ema_fast.get()),
      ema_slow: ema_of_series(&closes, detector.ema_slow.get()),
      macd: macd.compute(bars),
    })
  }

  /// Trend at `index`: BUY when EMA fast is above EMA slow, otherwise SELL.
  pub fn trend_at(&self, index: usize) -> Option<PatternType> {
    let fast = self.ema_fast.get(index)?;
    let slow = self.ema_slow.get(index)?;
    Some(if fast > slow { PatternType::Buy } else { PatternType::Sell })
  }
}

/// Does a `kind` 123 pattern complete exactly at `p3`?
///
/// Trend and MACD confluence are read at P3 itself, not at the latest bar.
pub fn pattern_123_at<T: OHLCV>(
  bars: &[T],
  series: &Setup123Series,
  p3: usize,
  kind: PatternType,
) -> Option<Pattern123> {
  let p1 = p3.checked_sub(2)?;
  let p2 = p3 - 1;
  let (b1, b2, b3) = (bars.get(p1)?, bars.get(p2)?, bars.get(p3)?);

  let fast = series.ema_fast.get(p3)?;
  let slow = series.ema_slow.get(p3)?;
  let histogram = series.macd.histogram.get(p3)?;

  let matched = match kind {
    PatternType::Buy => {
      fast > slow && b2.low() < b1.low() && b3.low() > b2.low() && histogram > 0.0
    },
    PatternType::Sell => {
      fast < slow && b2.high() > b1.high() && b3.high() < b2.high() && histogram < 0.0
    },
  };

  matched.then_some(Pattern123 { p1_index: p1, p2_index: p2, p3_index: p3, pattern_type: kind })
}

// ============================================================
// DETECTOR
// ============================================================

/// Live Setup 123 detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setup123Detector {
  pub ema_fast: Period,
  pub ema_slow: Period,
  pub macd_fast: Period,
  pub macd_slow: Period,
  pub macd_signal: Period,
  /// How many bars back from the latest one P1 may sit.
  pub lookback: Period,
  pub min_candles: Period,
  /// Reported when no historical statistics are supplied (percent).
  pub base_success_rate: f64,
}

impl Default for Setup123Detector {
  fn default() -> Self {
    Self {
      ema_fast: Period::new_const(8),
      ema_slow: Period::new_const(80),
      macd_fast: Period::new_const(12),
      macd_slow: Period::new_const(26),
      macd_signal: Period::new_const(9),
      lookback: Period::new_const(100),
      min_candles: Period::new_const(80),
      base_success_rate: 0.0,
    }
  }
}

impl Setup123Detector {
  /// Latest setup for `ticker`, reporting `base_success_rate`.
  pub fn detect<T: OHLCV>(&self, ticker: &str, bars: &[T]) -> Option<SetupResult> {
    self.detect_inner(ticker, bars, self.base_success_rate)
  }

  /// Latest setup, reporting the ticker's historical success rate.
  pub fn detect_with_stats<T: OHLCV>(
    &self,
    ticker: &str,
    bars: &[T],
    stats: &SignalStats,
  ) -> Option<SetupResult> {
    self.detect_inner(ticker, bars, stats.success_rate)
  }

  /// Most recent pattern: the current trend's side first, then the opposite.
  pub fn find_pattern<T: OHLCV>(&self, bars: &[T]) -> Option<Pattern123> {
    if bars.len() < self.min_candles.get() {
      return None;
    }
    let series = Setup123Series::compute(self, bars).ok()?;
    self.find_pattern_in(bars, &series)
  }

  fn find_pattern_in<T: OHLCV>(&self, bars: &[T], series: &Setup123Series) -> Option<Pattern123> {
    let last = bars.len().checked_sub(1)?;
    let preferred = series.trend_at(last)?;
    self
      .scan_for(bars, series, preferred)
      .or_else(|| self.scan_for(bars, series, preferred.opposite()))
  }

  /// Newest-to-oldest scan over P1 positions `last-2 ..= last-lookback`.
  fn scan_for<T: OHLCV>(
    &self,
    bars: &[T],
    series: &Setup123Series,
    kind: PatternType,
  ) -> Option<Pattern123> {
    let last = bars.len().checked_sub(1)?;
    let newest_p1 = last.checked_sub(2)?;
    let oldest_p1 = last.saturating_sub(self.lookback.get());
    (oldest_p1..=newest_p1).rev().find_map(|p1| pattern_123_at(bars, series, p1 + 2, kind))
  }

  fn detect_inner<T: OHLCV>(
    &self,
    ticker: &str,
    bars: &[T],
    success_rate: f64,
  ) -> Option<SetupResult> {
    if bars.len() < self.min_candles.get() {
      debug!(
        %ticker,
        bars = bars.len(),
        need = self.min_candles.get(),
        "setup 123: not enough candles"
      );
      return None;
    }

    let series = Setup123Series::compute(self, bars).ok()?;
    let Some(pattern) = self.find_pattern_in(bars, &series) else {
      debug!(%ticker, "setup 123: no pattern in lookback window");
      return None;
    };

    let last = bars.len() - 1;
    let levels = pattern.levels(bars)?;
    let status = levels.status(bars[last].close());
    debug!(
      %ticker,
      kind = pattern.pattern_type.as_str(),
      p3 = pattern.p3_index,
      status = status.as_str(),
      "setup 123: pattern found"
    );

    Some(self.build_result(ticker, bars, &series, pattern, levels, status, success_rate))
  }

  #[allow(clippy::too_many_arguments)]
  fn build_result<T: OHLCV>(
    &self,
    ticker: &str,
    bars: &[T],
    series: &Setup123Series,
    pattern: Pattern123,
    levels: TradeLevels,
    status: SetupStatus,
    success_rate: f64,
  ) -> SetupResult {
    let p3 = pattern.p3_index;
    let last = bars.len() - 1;
    let close = bars[last].close();
    let ema_fast = series.ema_fast.get(p3).unwrap_or_default();
    let ema_slow = series.ema_slow.get(p3).unwrap_or_default();
    let histogram = series.macd.histogram.get(p3).unwrap_or_default();
    let (b1, b2, b3) = (&bars[pattern.p1_index], &bars[pattern.p2_index], &bars[p3]);

    let (title, trend_line, shape_line, breakout) = match pattern.pattern_type {
      PatternType::Buy => (
        "Setup 123 de Compra",
        format!("MME{} acima da MME{} no P3", self.ema_fast.get(), self.ema_slow.get()),
        format!(
          "Fundos: P1 {} > P2 {} < P3 {}",
          fmt_price(b1.low()),
          fmt_price(b2.low()),
          fmt_price(b3.low())
        ),
        "rompimento da máxima do P3",
      ),
      PatternType::Sell => (
        "Setup 123 de Venda",
        format!("MME{} abaixo da MME{} no P3", self.ema_fast.get(), self.ema_slow.get()),
        format!(
          "Topos: P1 {} < P2 {} > P3 {}",
          fmt_price(b1.high()),
          fmt_price(b2.high()),
          fmt_price(b3.high())
        ),
        "rompimento da mínima do P3",
      ),
    };

    let status_line = match status {
      SetupStatus::Active => {
        format!("Entrada acionada: fechamento {} além de {}", fmt_price(close), fmt_price(levels.entry))
      },
      SetupStatus::Forming => format!("Aguardando {} em {}", breakout, fmt_price(levels.entry)),
      SetupStatus::Invalid => {
        format!("Stop violado: fechamento {} além de {}", fmt_price(close), fmt_price(levels.stop))
      },
    };

    let signals = vec![
      trend_line,
      shape_line,
      format!("Histograma MACD {histogram:+.4} no P3"),
      status_line.clone(),
    ];

    let explanation = format!(
      "{ticker}: {title} com P3 há {} barra(s). {status_line}.",
      last - p3
    );

    let mut meta = BTreeMap::new();
    meta.insert("p1Index".to_string(), pattern.p1_index as f64);
    meta.insert("p2Index".to_string(), pattern.p2_index as f64);
    meta.insert("p3Index".to_string(), p3 as f64);
    meta.insert("barsSinceP3".to_string(), (last - p3) as f64);
    meta.insert("entry".to_string(), levels.entry);
    meta.insert("stop".to_string(), levels.stop);
    meta.insert("target".to_string(), levels.target);
    meta.insert("riskPct".to_string(), levels.risk_pct());
    meta.insert("emaFast".to_string(), ema_fast);
    meta.insert("emaSlow".to_string(), ema_slow);
    meta.insert("histogram".to_string(), histogram);
    meta.insert("direction".to_string(), levels.direction.sign());

    SetupResult {
      id: SetupId::SETUP_123.as_str().to_string(),
      title: title.to_string(),
      status,
      direction: levels.direction,
      success_rate,
      risk: risk_from_stop_distance(&levels),
      stop_suggestion: format!("Stop em {} (extremo do P2)", fmt_price(levels.stop)),
      target_note: format!(
        "Alvo 1:1 em {} (risco de {} por unidade)",
        fmt_price(levels.target),
        fmt_price(levels.risk())
      ),
      explanation,
      signals,
      meta,
    }
  }
}

impl SetupDetector for Setup123Detector {
  fn id(&self) -> SetupId {
    SetupId::SETUP_123
  }

  fn min_bars(&self) -> usize {
    self.min_candles.get()
  }

  fn detect<T: OHLCV>(&self, ticker: &str, bars: &[T], ctx: &MarketContext) -> Option<SetupResult> {
    self.detect_inner(ticker, bars, ctx.success_rate)
  }

  fn validate_config(&self) -> Result<()> {
    if self.ema_fast >= self.ema_slow {
      return Err(SetupError::InvalidConfig(format!(
        "ema_fast ({}) must be shorter than ema_slow ({})",
        self.ema_fast.get(),
        self.ema_slow.get()
      )));
    }
    if self.min_candles < self.ema_slow {
      return Err(SetupError::InvalidConfig(format!(
        "min_candles ({}) must cover the ema_slow warm-up ({})",
        self.min_candles.get(),
        self.ema_slow.get()
      )));
    }
    if !(0.0..=100.0).contains(&self.base_success_rate) {
      return Err(SetupError::OutOfRange {
        field: "base_success_rate",
        value: self.base_success_rate,
        min: 0.0,
        max: 100.0,
      });
    }
    Macd::new(self.macd_fast, self.macd_slow, self.macd_signal).map(|_| ())
  }
}

impl ParameterizedDetector for Setup123Detector {
  fn param_meta() -> &'static [ParamMeta] {
    static META: [ParamMeta; 7] = [
      ParamMeta::period("ema_fast", 8.0, (5.0, 21.0, 1.0), "Fast EMA defining the local trend"),
      ParamMeta::period("ema_slow", 80.0, (50.0, 200.0, 10.0), "Slow EMA defining the local trend"),
      ParamMeta::period("macd_fast", 12.0, (8.0, 16.0, 1.0), "MACD fast EMA"),
      ParamMeta::period("macd_slow", 26.0, (20.0, 34.0, 1.0), "MACD slow EMA"),
      ParamMeta::period("macd_signal", 9.0, (5.0, 13.0, 1.0), "MACD signal EMA"),
      ParamMeta::period("lookback", 100.0, (20.0, 200.0, 10.0), "Bars scanned back for P1"),
      ParamMeta::period("min_candles", 80.0, (50.0, 200.0, 10.0), "Minimum history to run"),
    ];
    &META
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    Self::validate_params(params)?;
    let detector = Self {
      ema_fast: get_period(params, "ema_fast", 8)?,
      ema_slow: get_period(params, "ema_slow", 80)?,
      macd_fast: get_period(params, "macd_fast", 12)?,
      macd_slow: get_period(params, "macd_slow", 26)?,
      macd_signal: get_period(params, "macd_signal", 9)?,
      lookback: get_period(params, "lookback", 100)?,
      min_candles: get_period(params, "min_candles", 80)?,
      base_success_rate: params.get("base_success_rate").copied().unwrap_or(0.0),
    };
    detector.validate_config()?;
    Ok(detector)
  }

  fn setup_id_str() -> &'static str {
    SetupId::SETUP_123.as_str()
  }
}
