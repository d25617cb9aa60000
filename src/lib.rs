//! # setupscan - trading setup detection and signal history
//!
//! Indicators (EMA, MACD, ATR, DI+/DI-, Mystic Pulse), two setup detectors
//! (Setup 123 and Mystic Pulse) and a walk-forward backtest that resolves
//! every historical Setup 123 trigger into SUCCESS/FAILURE/PENDING/EXPIRED.
//!
//! Everything works on a finite, time-ascending slice of bars. Too little
//! history is never an error: point results are `None`, series results are
//! `None`-padded.
//!
//! ## Quick Start
//!
//! ```rust
//! use setupscan::prelude::*;
//!
//! // Define your OHLCV data
//! struct Bar { o: f64, h: f64, l: f64, c: f64, v: f64 }
//!
//! impl OHLCV for Bar {
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//!     fn volume(&self) -> f64 { self.v }
//! }
//!
//! // Create engine with both setup detectors
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .build()
//!     .unwrap();
//!
//! // Scan your data
//! let bars: Vec<Bar> = vec![];
//! let setups = engine.scan("PETR4", &bars).unwrap();
//! assert!(setups.is_empty());
//! ```

pub mod detectors;
pub mod history;
pub mod indicators;
pub mod params;
pub mod store;

pub use indicators::IndicatorSeries;

pub mod prelude {
    pub use crate::{
        // Detectors
        detectors::*,
        // History
        history::{
            calculate_signal_stats, detect_all_setup_123, HistoricalSignal, Outcome,
            SignalHistory, SignalStats,
        },
        // Indicators
        indicators::{
            Atr, DirectionalMovement, Ema, Indicator, IndicatorSeries, Macd, MacdPoint,
            MysticPulse, MysticPulseResult,
        },
        // Parameters
        params::{get_count, get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        // Parallel
        history_parallel,
        scan_parallel,
        // Engine
        BuiltinSetup,
        // Types
        Candle,
        ContextProvider,
        DefaultContextProvider,
        Direction,
        EngineBuilder,
        HistoryResult,
        MarketContext,
        OHLCVExt,
        Period,
        Ratio,
        Result,
        ScanError,
        ScanResult,
        // Core traits
        SetupDetector,
        SetupEngine,
        // Errors
        SetupError,
        SetupId,
        Trend,
        Volatility,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SetupError>;

/// Errors from configuration, candle validation and signal stores.
///
/// Analysis itself never fails for lack of history; see the crate docs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SetupError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },

    #[error("Signal store: {0}")]
    Store(String),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(SetupError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(SetupError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Bar count (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SetupError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Epoch timestamp, if the bar carries one.
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// `max(high - low, |high - prev_close|, |low - prev_close|)`; just the
    /// range without a previous close.
    #[inline]
    fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let range = self.range();
        match prev_close {
            Some(pc) => range
                .max((self.high() - pc).abs())
                .max((self.low() - pc).abs()),
            None => range,
        }
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(SetupError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(SetupError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(SetupError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Plain candle as delivered by a candle source.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    /// Epoch seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.time)
    }
}

// ============================================================
// SETUP IDENTITY
// ============================================================

/// Unique identifier for a setup type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetupId(pub &'static str);

impl SetupId {
    pub const SETUP_123: SetupId = SetupId("setup_123");
    pub const MYSTIC_PULSE: SetupId = SetupId("mystic_pulse");

    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Trade direction of a setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    #[inline]
    pub fn is_long(self) -> bool {
        matches!(self, Direction::Long)
    }

    /// `1.0` for long, `-1.0` for short.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

// ============================================================
// MARKET CONTEXT
// ============================================================

/// Market trend classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Trend {
    #[serde(rename = "Alta")]
    Up,
    #[serde(rename = "Baixa")]
    Down,
    #[default]
    #[serde(rename = "Lateral")]
    Sideways,
}

impl Trend {
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Trend::Up)
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Trend::Down)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Up => "Alta",
            Trend::Down => "Baixa",
            Trend::Sideways => "Lateral",
        }
    }
}

/// Volatility regime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Volatility {
    #[serde(rename = "Alta")]
    High,
    #[default]
    #[serde(rename = "Media")]
    Medium,
    #[serde(rename = "Baixa")]
    Low,
}

impl Volatility {
    pub fn as_str(self) -> &'static str {
        match self {
            Volatility::High => "Alta",
            Volatility::Medium => "Media",
            Volatility::Low => "Baixa",
        }
    }
}

/// Context a detector is evaluated against at the latest bar
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContext {
    pub trend: Trend,
    pub volatility: Volatility,
    /// Historical hit rate reported on results (percent).
    pub success_rate: f64,
}

/// Classifies trend and volatility at the latest bar
pub trait ContextProvider: Send + Sync {
    fn context<T: OHLCV>(&self, bars: &[T]) -> MarketContext;
}

/// EMA slope for trend, ATR as a percentage of price for volatility
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DefaultContextProvider {
    pub trend_period: Period,
    /// Bars over which the EMA slope is measured.
    pub slope_bars: Period,
    /// Slope (% change of the EMA) beyond which the trend is up/down.
    pub trend_threshold_pct: f64,
    pub atr_period: Period,
    /// ATR% at or above which volatility is high.
    pub high_volatility_pct: f64,
    /// ATR% below which volatility is low.
    pub low_volatility_pct: f64,
}

impl Default for DefaultContextProvider {
    fn default() -> Self {
        Self {
            trend_period: Period::new_const(20),
            slope_bars: Period::new_const(5),
            trend_threshold_pct: 1.0,
            atr_period: Period::new_const(14),
            high_volatility_pct: 3.0,
            low_volatility_pct: 1.5,
        }
    }
}

impl ContextProvider for DefaultContextProvider {
    fn context<T: OHLCV>(&self, bars: &[T]) -> MarketContext {
        MarketContext {
            trend: self.compute_trend(bars),
            volatility: self.compute_volatility(bars),
            success_rate: 0.0,
        }
    }
}

impl DefaultContextProvider {
    fn compute_trend<T: OHLCV>(&self, bars: &[T]) -> Trend {
        use indicators::Indicator;

        let ema = indicators::Ema::new(self.trend_period).compute(bars);
        let Some(last) = bars.len().checked_sub(1) else {
            return Trend::Sideways;
        };
        let Some(then) = last.checked_sub(self.slope_bars.get()) else {
            return Trend::Sideways;
        };
        let (Some(now), Some(before)) = (ema.get(last), ema.get(then)) else {
            return Trend::Sideways;
        };
        if before.abs() <= f64::EPSILON {
            return Trend::Sideways;
        }

        match (now - before) / before * 100.0 {
            c if c > self.trend_threshold_pct => Trend::Up,
            c if c < -self.trend_threshold_pct => Trend::Down,
            _ => Trend::Sideways,
        }
    }

    fn compute_volatility<T: OHLCV>(&self, bars: &[T]) -> Volatility {
        use indicators::Indicator;

        let (Some(atr), Some(bar)) = (indicators::Atr::new(self.atr_period).current(bars), bars.last())
        else {
            return Volatility::Medium;
        };
        let close = bar.close();
        if close.abs() <= f64::EPSILON {
            return Volatility::Medium;
        }

        match atr / close.abs() * 100.0 {
            p if p >= self.high_volatility_pct => Volatility::High,
            p if p < self.low_volatility_pct => Volatility::Low,
            _ => Volatility::Medium,
        }
    }
}

// ============================================================
// SETUP DETECTOR TRAIT
// ============================================================

/// Generic setup detector trait - evaluated at the latest bar
pub trait SetupDetector: Send + Sync {
    fn id(&self) -> SetupId;
    fn min_bars(&self) -> usize;
    fn detect<T: OHLCV>(
        &self,
        ticker: &str,
        bars: &[T],
        ctx: &MarketContext,
    ) -> Option<detectors::SetupResult>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN SETUPS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinSetup enum without boilerplate
macro_rules! define_builtin_setups {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin setup detectors - enum dispatch
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(tag = "kind", rename_all = "snake_case")]
        pub enum BuiltinSetup {
            $($variant($detector)),*
        }

        impl BuiltinSetup {
            #[inline]
            pub fn detect<T: OHLCV>(
                &self,
                ticker: &str,
                bars: &[T],
                ctx: &MarketContext,
            ) -> Option<SetupResult> {
                match self {
                    $(Self::$variant(d) => SetupDetector::detect(d, ticker, bars, ctx)),*
                }
            }

            #[inline]
            pub fn id(&self) -> SetupId {
                match self {
                    $(Self::$variant(d) => SetupDetector::id(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => SetupDetector::min_bars(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => SetupDetector::validate_config(d)),*
                }
            }
        }

        $(impl From<$detector> for BuiltinSetup {
            fn from(detector: $detector) -> Self {
                Self::$variant(detector)
            }
        })*
    };
}

define_builtin_setups! {
    Setup123(Setup123Detector),
    MysticPulse(MysticPulseDetector),
}

// ============================================================
// SETUP ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub validate_data: bool,
    pub setup_filter: Option<Vec<SetupId>>,
}

/// Runs the configured setup detectors and the signal-history backtest
pub struct SetupEngine<C: ContextProvider = DefaultContextProvider> {
    setups: Vec<BuiltinSetup>,
    history: history::SignalHistory,
    context_provider: C,
    config: EngineConfig,
}

impl<C: ContextProvider> SetupEngine<C> {
    pub fn new(context_provider: C) -> Self {
        Self {
            setups: Vec::new(),
            history: history::SignalHistory::default(),
            context_provider,
            config: EngineConfig::default(),
        }
    }

    #[inline]
    pub fn setups(&self) -> &[BuiltinSetup] {
        &self.setups
    }

    #[inline]
    pub fn signal_history(&self) -> &history::SignalHistory {
        &self.history
    }

    /// Context at the latest bar from the configured provider.
    #[inline]
    pub fn compute_context<T: OHLCV>(&self, bars: &[T]) -> MarketContext {
        self.context_provider.context(bars)
    }

    /// Run every detector against a caller-supplied context.
    pub fn scan_with_context<T: OHLCV>(
        &self,
        ticker: &str,
        bars: &[T],
        ctx: &MarketContext,
    ) -> Vec<SetupResult> {
        self.setups
            .iter()
            .filter(|d| self.should_include(d.id()))
            .filter(|d| bars.len() >= d.min_bars())
            .filter_map(|d| d.detect(ticker, bars, ctx))
            .collect()
    }

    /// Run every detector against the provider's context.
    pub fn scan<T: OHLCV>(&self, ticker: &str, bars: &[T]) -> Result<Vec<SetupResult>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }

        let ctx = self.compute_context(bars);
        Ok(self.scan_with_context(ticker, bars, &ctx))
    }

    /// Like [`scan`](Self::scan), reporting the ticker's historical success rate.
    pub fn scan_with_stats<T: OHLCV>(
        &self,
        ticker: &str,
        bars: &[T],
        stats: &history::SignalStats,
    ) -> Result<Vec<SetupResult>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }

        let ctx = MarketContext {
            success_rate: stats.success_rate,
            ..self.compute_context(bars)
        };
        Ok(self.scan_with_context(ticker, bars, &ctx))
    }

    /// Every historical Setup 123 trigger with its resolved outcome.
    pub fn history<T: OHLCV + Sync>(
        &self,
        ticker: &str,
        timeframe: &str,
        bars: &[T],
    ) -> Result<Vec<history::HistoricalSignal>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }

        Ok(self.history.run(ticker, timeframe, bars))
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn should_include(&self, id: SetupId) -> bool {
        match self.config.setup_filter {
            Some(ref filter) => filter.contains(&id),
            None => true,
        }
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                SetupError::InvalidOHLCV { reason, .. } => {
                    SetupError::InvalidOHLCV { index: i, reason }
                }
                other => other,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for d in &self.setups {
            d.validate_config()?;
        }
        self.history.validate_config()
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating SetupEngine instances
pub struct EngineBuilder<C: ContextProvider = DefaultContextProvider> {
    context_provider: C,
    setups: Vec<BuiltinSetup>,
    history: history::SignalHistory,
    config: EngineConfig,
}

impl Default for EngineBuilder<DefaultContextProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder<DefaultContextProvider> {
    pub fn new() -> Self {
        Self {
            context_provider: DefaultContextProvider::default(),
            setups: Vec::new(),
            history: history::SignalHistory::default(),
            config: EngineConfig::default(),
        }
    }
}

impl<C: ContextProvider> EngineBuilder<C> {
    /// Change context provider
    pub fn context_provider<C2: ContextProvider>(self, provider: C2) -> EngineBuilder<C2> {
        EngineBuilder {
            context_provider: provider,
            setups: self.setups,
            history: self.history,
            config: self.config,
        }
    }

    /// Add both setup detectors with default configurations
    pub fn with_all_defaults(self) -> Self {
        self.add(Setup123Detector::with_defaults())
            .add(MysticPulseDetector::with_defaults())
    }

    /// Add a setup detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: impl Into<BuiltinSetup>) -> Self {
        self.setups.push(detector.into());
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: impl Into<BuiltinSetup>) -> Result<Self> {
        let detector = detector.into();
        detector.validate_config()?;
        self.setups.push(detector);
        Ok(self)
    }

    /// Backtest configuration used by `SetupEngine::history`
    pub fn history(mut self, history: history::SignalHistory) -> Self {
        self.history = history;
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Filter to specific setups only
    pub fn only_setups(mut self, ids: impl IntoIterator<Item = SetupId>) -> Self {
        self.config.setup_filter = Some(ids.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<SetupEngine<C>> {
        let engine = SetupEngine {
            setups: self.setups,
            history: self.history,
            context_provider: self.context_provider,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Live setups of a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub ticker: String,
    pub setups: Vec<SetupResult>,
}

/// Signal history of a single instrument
#[derive(Debug)]
pub struct HistoryResult {
    pub ticker: String,
    pub signals: Vec<history::HistoricalSignal>,
    pub stats: history::SignalStats,
}

/// Error from processing a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub ticker: String,
    pub error: SetupError,
}

/// Parallel live scan of multiple instruments
pub fn scan_parallel<'a, T, I, C>(
    engine: &SetupEngine<C>,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
    C: ContextProvider + Sync,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(ticker, bars)| {
            engine
                .scan(ticker, bars)
                .map(|setups| ScanResult {
                    ticker: ticker.to_string(),
                    setups,
                })
                .map_err(|error| ScanError {
                    ticker: ticker.to_string(),
                    error,
                })
        })
        .collect();

    partition(results)
}

/// Parallel signal history of multiple instruments on one timeframe
pub fn history_parallel<'a, T, I, C>(
    engine: &SetupEngine<C>,
    timeframe: &str,
    instruments: I,
) -> (Vec<HistoryResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
    C: ContextProvider + Sync,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(ticker, bars)| {
            engine
                .history(ticker, timeframe, bars)
                .map(|signals| HistoryResult {
                    ticker: ticker.to_string(),
                    stats: history::calculate_signal_stats(&signals),
                    signals,
                })
                .map_err(|error| ScanError {
                    ticker: ticker.to_string(),
                    error,
                })
        })
        .collect();

    partition(results)
}

fn partition<R>(results: Vec<std::result::Result<R, ScanError>>) -> (Vec<R>, Vec<ScanError>) {
    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TYPE ALIASES
// ============================================================

/// Default engine with DefaultContextProvider
pub type DefaultEngine = SetupEngine<DefaultContextProvider>;

// ============================================================
// TESTS
// ============================================================
