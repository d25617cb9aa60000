//! Mystic Pulse: a DI+/DI- momentum accumulator.
//!
//! Walks the DI series once. When DI+ rises and is above DI-, the positive
//! streak grows and the negative one resets; the mirror rule applies to DI-.
//! `trend_score = positive_count - negative_count`. Intensity normalises
//! `|trend_score|` against the largest `|trend_score|` seen in the trailing
//! `collect_length` bars and shapes it with `gamma`:
//! `intensity = (|score| / window_peak) ^ gamma`, always within `[0, 1]`.

use serde::{Deserialize, Serialize};

use super::dmi::{DiPoint, DirectionalMovement};
use crate::{Period, Result, SetupError, OHLCV};

/// Mystic Pulse state at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysticPulseResult {
    pub di_plus: f64,
    pub di_minus: f64,
    pub positive_count: u32,
    pub negative_count: u32,
    pub trend_score: i64,
    pub intensity: f64,
    pub is_bullish: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysticPulse {
    pub adx_length: Period,
    pub collect_length: Period,
    pub gamma: f64,
}

impl Default for MysticPulse {
    fn default() -> Self {
        Self {
            adx_length: Period::new_const(9),
            collect_length: Period::new_const(100),
            gamma: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Streak {
    positive: u32,
    negative: u32,
}

impl Streak {
    fn advance(mut self, prev: DiPoint, cur: DiPoint) -> Self {
        if cur.plus > prev.plus && cur.plus > cur.minus {
            self.positive += 1;
            self.negative = 0;
        } else if cur.minus > prev.minus && cur.minus > cur.plus {
            self.negative += 1;
            self.positive = 0;
        }
        self
    }

    fn score(self) -> i64 {
        i64::from(self.positive) - i64::from(self.negative)
    }
}

impl MysticPulse {
    pub fn new(adx_length: Period, collect_length: Period, gamma: f64) -> Result<Self> {
        let pulse = Self {
            adx_length,
            collect_length,
            gamma,
        };
        pulse.validate()?;
        Ok(pulse)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(SetupError::OutOfRange {
                field: "gamma",
                value: self.gamma,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(())
    }

    /// Bars needed before the first defined result.
    #[inline]
    pub fn min_bars(&self) -> usize {
        self.adx_length.get() + 2
    }

    /// One entry per bar; `None` for the first `min_bars() - 1` positions.
    pub fn series<T: OHLCV>(&self, bars: &[T]) -> Vec<Option<MysticPulseResult>> {
        let di = DirectionalMovement::new(self.adx_length).compute(bars);
        if di.is_empty() {
            return Vec::new();
        }

        let streaks: Vec<Streak> = std::iter::once(Streak::default())
            .chain(di.windows(2).scan(Streak::default(), |streak, w| {
                *streak = streak.advance(w[0], w[1]);
                Some(*streak)
            }))
            .collect();

        let collect = self.collect_length.get();
        let warm_up = self.min_bars() - 1;

        (0..di.len())
            .map(|i| {
                if i < warm_up {
                    return None;
                }
                let streak = streaks[i];
                let score = streak.score();
                let window_start = (i + 1).saturating_sub(collect);
                let peak = streaks[window_start..=i]
                    .iter()
                    .map(|s| s.score().unsigned_abs())
                    .max()
                    .unwrap_or(0);

                Some(MysticPulseResult {
                    di_plus: di[i].plus,
                    di_minus: di[i].minus,
                    positive_count: streak.positive,
                    negative_count: streak.negative,
                    trend_score: score,
                    intensity: pulse_intensity(score.unsigned_abs(), peak, self.gamma),
                    is_bullish: score > 0,
                })
            })
            .collect()
    }

    /// Result at the last bar, `None` with fewer than `min_bars()` bars.
    pub fn current<T: OHLCV>(&self, bars: &[T]) -> Option<MysticPulseResult> {
        if bars.len() < self.min_bars() {
            return None;
        }
        self.series(bars).pop().flatten()
    }
}

/// `(magnitude / peak) ^ gamma`, clamped to `[0, 1]`; zero when `peak` is zero.
pub fn pulse_intensity(magnitude: u64, peak: u64, gamma: f64) -> f64 {
    if peak == 0 {
        return 0.0;
    }
    let normalized = (magnitude as f64 / peak as f64).min(1.0);
    normalized.powf(gamma).clamp(0.0, 1.0)
}
