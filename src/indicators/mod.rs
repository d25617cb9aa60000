//! Technical indicators over OHLCV sequences.
//!
//! Every indicator is a pure function of `(bars, parameters)`. The series form
//! returns an [`IndicatorSeries`] aligned 1:1 with the input bars, where `None`
//! marks warm-up positions. The point form returns the value at the last bar.
//! Nothing is cached between calls.

pub mod atr;
pub mod dmi;
pub mod ema;
pub mod macd;
pub mod mystic_pulse;

pub use atr::{true_range, wilder_smooth, Atr};
pub use dmi::{DiPoint, DirectionalMovement};
pub use ema::{ema_of_series, Ema};
pub use macd::{Macd, MacdPoint, MacdSeries};
pub use mystic_pulse::{pulse_intensity, MysticPulse, MysticPulseResult};

use crate::OHLCV;

/// Single-output indicator over a bar sequence.
pub trait Indicator {
    fn name(&self) -> &str;

    /// Number of leading bars that can never hold a value.
    fn lookback(&self) -> usize;

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorSeries;

    /// Value at the last bar, `None` while warming up or on empty input.
    fn current<T: OHLCV>(&self, bars: &[T]) -> Option<f64> {
        self.compute(bars).last()
    }
}

/// Indicator output aligned with the input bars. `None` = not enough history.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// A series of `len` warm-up positions.
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Value at the last position (`None` if empty or still warming up).
    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// Index of the first defined value.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    /// Iterates from the start every time it is called.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }

    pub fn as_slice(&self) -> &[Option<f64>] {
        &self.values
    }
}

impl FromIterator<Option<f64>> for IndicatorSeries {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Close prices as a defined-everywhere series input.
pub(crate) fn closes<T: OHLCV>(bars: &[T]) -> Vec<Option<f64>> {
    bars.iter().map(|b| Some(b.close())).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::Candle;

    /// Bars from closes: open = previous close, high/low one point outside the body.
    pub fn make_bars(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                Candle::new(
                    i as i64 * 86_400,
                    open,
                    open.max(close) + 1.0,
                    open.min(close) - 1.0,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        data.iter()
            .enumerate()
            .map(|(i, &(o, h, l, c))| Candle::new(i as i64 * 86_400, o, h, l, c, 1000.0))
            .collect()
    }

    pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
        assert!(
            (actual - expected).abs() < epsilon,
            "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
            (actual - expected).abs()
        );
    }

    pub const DEFAULT_EPSILON: f64 = 1e-10;
}
