//! Mystic Pulse setup - momentum confirmation against a supplied market context
//!
//! Direction follows the sign of the pulse's trend score. The setup is active
//! when the streak is strong, intense and aligned with the external trend (a
//! sideways trend accepts either side). Counter-trend strength is reported as
//! forming with high risk.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::helpers::{fmt_price, risk_from_volatility, TradeLevels};
use super::{RiskLevel, SetupResult, SetupStatus};
use crate::{
  indicators::{Atr, Indicator, MysticPulse, MysticPulseResult},
  params::{get_count, get_period, get_ratio, ParamMeta, ParameterizedDetector},
  Direction, MarketContext, Period, Ratio, Result, SetupDetector, SetupError, SetupId, Trend,
  Volatility, OHLCV,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysticPulseDetector {
  pub adx_length: Period,
  pub collect_length: Period,
  pub gamma: f64,
  /// Minimum `|trend_score|` for a strong streak.
  pub strong_threshold: u32,
  /// Minimum intensity for a strong streak.
  pub intensity_threshold: Ratio,
  pub atr_period: Period,
  /// Stop distance in ATRs.
  pub atr_stop_multiple: f64,
  /// Target distance in units of stop distance.
  pub target_multiple: f64,
}

impl Default for MysticPulseDetector {
  fn default() -> Self {
    Self {
      adx_length: Period::new_const(9),
      collect_length: Period::new_const(100),
      gamma: 0.8,
      strong_threshold: 5,
      intensity_threshold: Ratio::new_const(0.6),
      atr_period: Period::new_const(14),
      atr_stop_multiple: 1.5,
      target_multiple: 2.0,
    }
  }
}

impl MysticPulseDetector {
  pub fn pulse(&self) -> MysticPulse {
    MysticPulse { adx_length: self.adx_length, collect_length: self.collect_length, gamma: self.gamma }
  }

  /// Setup at the latest bar, or `None` without enough history or a valid ATR.
  pub fn detect<T: OHLCV>(
    &self,
    ticker: &str,
    bars: &[T],
    trend: Trend,
    volatility: Volatility,
    success_rate: f64,
  ) -> Option<SetupResult> {
    let Some(pulse) = self.pulse().current(bars) else {
      debug!(%ticker, bars = bars.len(), "mystic pulse: not enough candles");
      return None;
    };
    let Some(atr) = Atr::new(self.atr_period).current(bars) else {
      debug!(%ticker, bars = bars.len(), "mystic pulse: ATR undefined");
      return None;
    };
    let close = bars.last()?.close();

    let direction = if pulse.is_bullish { Direction::Long } else { Direction::Short };
    let magnitude = pulse.trend_score.unsigned_abs();
    // a zero score has no side to oppose the trend with
    let aligned = magnitude == 0
      || match trend {
        Trend::Sideways => true,
        Trend::Up => direction == Direction::Long,
        Trend::Down => direction == Direction::Short,
      };
    let strong = magnitude >= u64::from(self.strong_threshold)
      && pulse.intensity >= self.intensity_threshold.get();

    let status = match (strong, aligned) {
      (true, true) => SetupStatus::Active,
      (true, false) => SetupStatus::Forming,
      (false, _) if magnitude >= 1 => SetupStatus::Forming,
      _ => SetupStatus::Invalid,
    };
    let risk = if aligned { risk_from_volatility(volatility) } else { RiskLevel::High };

    let stop_distance = self.atr_stop_multiple * atr;
    let stop = close - direction.sign() * stop_distance;
    let levels = TradeLevels::with_reward(direction, close, stop, self.target_multiple);

    debug!(
      %ticker,
      score = pulse.trend_score,
      intensity = pulse.intensity,
      status = status.as_str(),
      risk = risk.as_str(),
      "mystic pulse: classified"
    );

    Some(self.build_result(ticker, &pulse, atr, levels, status, risk, trend, aligned, success_rate))
  }

  #[allow(clippy::too_many_arguments)]
  fn build_result(
    &self,
    ticker: &str,
    pulse: &MysticPulseResult,
    atr: f64,
    levels: TradeLevels,
    status: SetupStatus,
    risk: RiskLevel,
    trend: Trend,
    aligned: bool,
    success_rate: f64,
  ) -> SetupResult {
    let (title, side) = match levels.direction {
      Direction::Long => ("Mystic Pulse Compra", "compradora"),
      Direction::Short => ("Mystic Pulse Venda", "vendedora"),
    };

    let mut signals = vec![
      format!("DI+ {:.2} / DI- {:.2}", pulse.di_plus, pulse.di_minus),
      format!(
        "Pulso {:+} ({} positivos, {} negativos)",
        pulse.trend_score, pulse.positive_count, pulse.negative_count
      ),
      format!("Intensidade {:.0}%", pulse.intensity * 100.0),
      format!("ATR({}) {}", self.atr_period.get(), fmt_price(atr)),
    ];
    if !aligned {
      signals.push(format!("Contra a tendência {}", trend.as_str()));
    }

    let explanation = match status {
      SetupStatus::Active => format!(
        "{ticker}: pressão {side} forte e alinhada à tendência {} (pulso {:+}, intensidade {:.0}%).",
        trend.as_str(),
        pulse.trend_score,
        pulse.intensity * 100.0
      ),
      SetupStatus::Forming if !aligned => format!(
        "{ticker}: pressão {side} contra a tendência {}; aguardar confirmação (pulso {:+}).",
        trend.as_str(),
        pulse.trend_score
      ),
      SetupStatus::Forming => format!(
        "{ticker}: pressão {side} em formação (pulso {:+}, intensidade {:.0}%).",
        pulse.trend_score,
        pulse.intensity * 100.0
      ),
      SetupStatus::Invalid => {
        format!("{ticker}: sem pressão direcional (DI+ {:.2}, DI- {:.2}).", pulse.di_plus, pulse.di_minus)
      },
    };

    let mut meta = BTreeMap::new();
    meta.insert("diPlus".to_string(), pulse.di_plus);
    meta.insert("diMinus".to_string(), pulse.di_minus);
    meta.insert("positiveCount".to_string(), f64::from(pulse.positive_count));
    meta.insert("negativeCount".to_string(), f64::from(pulse.negative_count));
    meta.insert("trendScore".to_string(), pulse.trend_score as f64);
    meta.insert("intensity".to_string(), pulse.intensity);
    meta.insert("atr".to_string(), atr);
    meta.insert("entry".to_string(), levels.entry);
    meta.insert("stop".to_string(), levels.stop);
    meta.insert("target".to_string(), levels.target);
    meta.insert("direction".to_string(), levels.direction.sign());

    SetupResult {
      id: SetupId::MYSTIC_PULSE.as_str().to_string(),
      title: title.to_string(),
      status,
      direction: levels.direction,
      success_rate,
      risk,
      stop_suggestion: format!(
        "Stop em {} ({:.1}x ATR)",
        fmt_price(levels.stop),
        self.atr_stop_multiple
      ),
      target_note: format!(
        "Alvo em {} ({:.1}:1 sobre o risco)",
        fmt_price(levels.target),
        self.target_multiple
      ),
      explanation,
      signals,
      meta,
    }
  }
}

impl SetupDetector for MysticPulseDetector {
  fn id(&self) -> SetupId {
    SetupId::MYSTIC_PULSE
  }

  fn min_bars(&self) -> usize {
    (self.adx_length.get() + 2).max(self.atr_period.get() + 1)
  }

  fn detect<T: OHLCV>(&self, ticker: &str, bars: &[T], ctx: &MarketContext) -> Option<SetupResult> {
    MysticPulseDetector::detect(self, ticker, bars, ctx.trend, ctx.volatility, ctx.success_rate)
  }

  fn validate_config(&self) -> Result<()> {
    self.pulse().validate()?;
    for (field, value) in [
      ("atr_stop_multiple", self.atr_stop_multiple),
      ("target_multiple", self.target_multiple),
    ] {
      if !value.is_finite() || value <= 0.0 {
        return Err(SetupError::OutOfRange { field, value, min: f64::MIN_POSITIVE, max: f64::MAX });
      }
    }
    Ok(())
  }
}

impl ParameterizedDetector for MysticPulseDetector {
  fn param_meta() -> &'static [ParamMeta] {
    static META: [ParamMeta; 8] = [
      ParamMeta::period("adx_length", 9.0, (5.0, 21.0, 4.0), "DI+/DI- smoothing length"),
      ParamMeta::period("collect_length", 100.0, (50.0, 200.0, 50.0), "Intensity window"),
      ParamMeta::positive("gamma", 0.8, (0.5, 2.0, 0.5), "Intensity curve exponent"),
      ParamMeta::count("strong_threshold", 5.0, (3.0, 9.0, 3.0), "Minimum |trend score| for a strong streak"),
      ParamMeta::ratio("intensity_threshold", 0.6, (0.25, 0.75, 0.25), "Minimum intensity"),
      ParamMeta::period("atr_period", 14.0, (7.0, 21.0, 7.0), "ATR period for the stop"),
      ParamMeta::positive("atr_stop_multiple", 1.5, (1.0, 2.0, 0.5), "Stop distance in ATRs"),
      ParamMeta::positive("target_multiple", 2.0, (1.0, 3.0, 1.0), "Target distance in stop distances"),
    ];
    &META
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    Self::validate_params(params)?;
    let defaults = Self::default();
    let detector = Self {
      adx_length: get_period(params, "adx_length", 9)?,
      collect_length: get_period(params, "collect_length", 100)?,
      gamma: params.get("gamma").copied().unwrap_or(defaults.gamma),
      strong_threshold: get_count(params, "strong_threshold", defaults.strong_threshold)?,
      intensity_threshold: get_ratio(params, "intensity_threshold", 0.6)?,
      atr_period: get_period(params, "atr_period", 14)?,
      atr_stop_multiple: params.get("atr_stop_multiple").copied().unwrap_or(defaults.atr_stop_multiple),
      target_multiple: params.get("target_multiple").copied().unwrap_or(defaults.target_multiple),
    };
    detector.validate_config()?;
    Ok(detector)
  }

  fn setup_id_str() -> &'static str {
    SetupId::MYSTIC_PULSE.as_str()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Candle;

  fn uptrend(n: usize) -> Vec<Candle> {
    (0..n)
      .map(|i| {
        let c = 100.0 + 2.0 * i as f64;
        Candle::new(i as i64, c - 1.0, c + 1.0, c - 1.0, c, 1000.0)
      })
      .collect()
  }

  fn downtrend(n: usize) -> Vec<Candle> {
    (0..n)
      .map(|i| {
        let c = 200.0 - 2.0 * i as f64;
        Candle::new(i as i64, c + 1.0, c + 1.0, c - 1.0, c, 1000.0)
      })
      .collect()
  }

  #[test]
  fn test_aligned_uptrend_is_active() {
    let detector = MysticPulseDetector::with_defaults();
    let result = detector.detect("VALE3", &uptrend(25), Trend::Up, Volatility::Medium, 65.0).unwrap();
    assert_eq!(result.status, SetupStatus::Active);
    assert_eq!(result.direction, Direction::Long);
    assert_eq!(result.success_rate, 65.0);
    assert_eq!(result.risk, RiskLevel::Moderate);
    assert!(result.meta_value("stop").unwrap() < result.meta_value("entry").unwrap());
  }

  #[test]
  fn test_counter_trend_is_high_risk() {
    let detector = MysticPulseDetector::with_defaults();
    for volatility in [Volatility::Low, Volatility::Medium, Volatility::High] {
      let result = detector.detect("VALE3", &uptrend(25), Trend::Down, volatility, 65.0).unwrap();
      assert_eq!(result.risk, RiskLevel::High);
      assert_eq!(result.status, SetupStatus::Forming);
    }
  }

  #[test]
  fn test_sideways_accepts_short() {
    let detector = MysticPulseDetector::with_defaults();
    let result =
      detector.detect("VALE3", &downtrend(25), Trend::Sideways, Volatility::Low, 50.0).unwrap();
    assert_eq!(result.direction, Direction::Short);
    assert_eq!(result.status, SetupStatus::Active);
    assert_eq!(result.risk, RiskLevel::Low);
    assert!(result.meta_value("stop").unwrap() > result.meta_value("entry").unwrap());
  }

  #[test]
  fn test_stop_is_atr_multiple() {
    let detector = MysticPulseDetector::with_defaults();
    let bars = uptrend(25);
    let result = detector.detect("VALE3", &bars, Trend::Up, Volatility::Low, 0.0).unwrap();
    let atr = result.meta_value("atr").unwrap();
    let entry = result.meta_value("entry").unwrap();
    assert_eq!(entry, bars[24].close);
    assert!((entry - result.meta_value("stop").unwrap() - 1.5 * atr).abs() < 1e-9);
    assert!((result.meta_value("target").unwrap() - entry - 3.0 * atr).abs() < 1e-9);
  }

  #[test]
  fn test_flat_series_is_invalid() {
    let bars: Vec<Candle> =
      (0..30).map(|i| Candle::new(i, 100.0, 101.0, 99.0, 100.0, 1000.0)).collect();
    let result = MysticPulseDetector::with_defaults()
      .detect("ITUB4", &bars, Trend::Sideways, Volatility::Low, 0.0)
      .unwrap();
    assert_eq!(result.status, SetupStatus::Invalid);
  }

  #[test]
  fn test_flat_series_is_not_counter_trend() {
    let bars: Vec<Candle> =
      (0..30).map(|i| Candle::new(i, 100.0, 101.0, 99.0, 100.0, 1000.0)).collect();
    let result = MysticPulseDetector::with_defaults()
      .detect("ITUB4", &bars, Trend::Up, Volatility::Low, 0.0)
      .unwrap();
    assert_eq!(result.meta_value("trendScore"), Some(0.0));
    assert_eq!(result.status, SetupStatus::Invalid);
    assert_eq!(result.risk, RiskLevel::Low);
    assert!(result.signals.iter().all(|s| !s.starts_with("Contra")));
  }

  #[test]
  fn test_short_history_is_none() {
    let detector = MysticPulseDetector::with_defaults();
    assert!(detector.detect("VALE3", &uptrend(5), Trend::Up, Volatility::Low, 0.0).is_none());
    // pulse is ready at 11 bars but ATR(14) is not
    assert!(detector.detect("VALE3", &uptrend(12), Trend::Up, Volatility::Low, 0.0).is_none());
    assert_eq!(SetupDetector::min_bars(&detector), 15);
  }

  #[test]
  fn test_signals_embed_live_values() {
    let detector = MysticPulseDetector::with_defaults();
    let a = detector.detect("VALE3", &uptrend(20), Trend::Up, Volatility::Low, 0.0).unwrap();
    let b = detector.detect("VALE3", &uptrend(25), Trend::Up, Volatility::Low, 0.0).unwrap();
    assert_ne!(a.signals, b.signals);
  }

  #[test]
  fn test_with_params_validates() {
    let mut params = HashMap::new();
    params.insert("gamma", 1.2);
    params.insert("strong_threshold", 8.0);
    let detector = MysticPulseDetector::with_params(&params).unwrap();
    assert_eq!(detector.gamma, 1.2);
    assert_eq!(detector.strong_threshold, 8);

    params.insert("gamma", -1.0);
    assert!(MysticPulseDetector::with_params(&params).is_err());
  }

  #[test]
  fn test_with_params_rejects_bad_counts() {
    for bad in [-1.0, 4.5, f64::NAN] {
      let mut params = HashMap::new();
      params.insert("strong_threshold", bad);
      assert!(MysticPulseDetector::with_params(&params).is_err());
    }
  }

  #[test]
  fn test_param_meta_covers_with_params_keys() {
    let names: Vec<&str> = MysticPulseDetector::param_meta().iter().map(|m| m.name).collect();
    for key in ["gamma", "strong_threshold", "atr_stop_multiple", "target_multiple"] {
      assert!(names.contains(&key), "missing {key}");
    }
    let defaults: HashMap<&str, f64> =
      MysticPulseDetector::param_meta().iter().map(|m| (m.name, m.default)).collect();
    let detector = MysticPulseDetector::with_params(&defaults).unwrap();
    assert_eq!(detector.strong_threshold, 5);
    assert_eq!(detector.target_multiple, 2.0);
  }
}
