//! Exponential Moving Average (EMA).
//!
//! Seed: SMA of the first `period` values. Then
//! `ema[i] = value[i] * k + ema[i-1] * (1 - k)` with `k = 2 / (period + 1)`.
//! Lookback: period - 1.

use super::{closes, Indicator, IndicatorSeries};
use crate::{Period, OHLCV};

#[derive(Debug, Clone)]
pub struct Ema {
    period: Period,
    name: String,
}

impl Ema {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            name: format!("ema_{}", period.get()),
        }
    }

    #[inline]
    pub fn period(&self) -> usize {
        self.period.get()
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.get() - 1
    }

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorSeries {
        ema_of_series(&closes(bars), self.period.get())
    }
}

/// EMA of an arbitrary series that may start with undefined positions.
///
/// The seed window is the first `period` consecutive defined values; output
/// stays `None` before the seed and after any later gap in the input.
pub fn ema_of_series(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 {
        return IndicatorSeries::from_values(result);
    }

    let Some(start) = values.iter().position(Option::is_some) else {
        return IndicatorSeries::from_values(result);
    };
    let seed_end = start + period;
    if seed_end > n {
        return IndicatorSeries::from_values(result);
    }

    let mut sum = 0.0;
    for v in &values[start..seed_end] {
        match v {
            Some(v) => sum += v,
            None => return IndicatorSeries::from_values(result),
        }
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut prev = sum / period as f64;
    result[seed_end - 1] = Some(prev);

    for i in seed_end..n {
        let Some(value) = values[i] else {
            break;
        };
        prev = value * k + prev * (1.0 - k);
        result[i] = Some(prev);
    }

    IndicatorSeries::from_values(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn ema(period: usize) -> Ema {
        Ema::new(Period::new(period).unwrap())
    }

    #[test]
    fn ema_period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = ema(1).compute(&bars);
        assert_approx(result.get(0).unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(result.get(1).unwrap(), 200.0, DEFAULT_EPSILON);
        assert_approx(result.get(2).unwrap(), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // k = 0.5, seed SMA(10,11,12) = 11
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = ema(3).compute(&bars);

        assert!(result.get(0).is_none());
        assert!(result.get(1).is_none());
        assert_approx(result.get(2).unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(result.get(3).unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(result.get(4).unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_short_input_is_undefined() {
        let bars = make_bars(&[10.0, 11.0]);
        let result = ema(3).compute(&bars);
        assert_eq!(result.len(), 2);
        assert!(result.first_defined().is_none());
        assert!(ema(3).current(&bars).is_none());
    }

    #[test]
    fn ema_of_series_skips_leading_none() {
        let values = [None, None, Some(2.0), Some(4.0), Some(6.0)];
        let result = ema_of_series(&values, 2);
        assert_eq!(result.first_defined(), Some(3));
        assert_approx(result.get(3).unwrap(), 3.0, DEFAULT_EPSILON);
        // k = 2/3: 6 * 2/3 + 3 * 1/3 = 5
        assert_approx(result.get(4).unwrap(), 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(ema(80).lookback(), 79);
        assert_eq!(ema(1).lookback(), 0);
        assert_eq!(ema(8).name(), "ema_8");
    }
}
