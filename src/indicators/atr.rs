//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! The first bar has no previous close and yields no TR sample, so the
//! Wilder seed is the mean of TR[1..=period] and ATR is defined from
//! index `period` on.

use super::{Indicator, IndicatorSeries};
use crate::{OHLCVExt, Period, OHLCV};

#[derive(Debug, Clone)]
pub struct Atr {
    period: Period,
    name: String,
}

impl Atr {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            name: format!("atr_{}", period.get()),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.get()
    }

    fn compute<T: OHLCV>(&self, bars: &[T]) -> IndicatorSeries {
        wilder_smooth(&true_range(bars), self.period.get())
    }
}

/// True Range per bar. Index 0 is `None` (no previous close).
pub fn true_range<T: OHLCV>(bars: &[T]) -> Vec<Option<f64>> {
    let mut tr = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return tr;
    }
    tr.push(None);
    tr.extend(
        bars.windows(2)
            .map(|w| Some(w[1].true_range(Some(w[0].close())))),
    );
    tr
}

/// Wilder smoothing (alpha = 1/period), seeded with the mean of the first
/// `period` consecutive defined values.
pub fn wilder_smooth(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 {
        return IndicatorSeries::from_values(result);
    }

    let Some(start) = values.iter().position(Option::is_some) else {
        return IndicatorSeries::from_values(result);
    };
    let seed_end = start + period;
    if seed_end > n || values[start..seed_end].iter().any(Option::is_none) {
        return IndicatorSeries::from_values(result);
    }

    let seed = values[start..seed_end].iter().flatten().sum::<f64>() / period as f64;
    result[seed_end - 1] = Some(seed);

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in seed_end..n {
        let Some(value) = values[i] else {
            break;
        };
        prev = alpha * value + (1.0 - alpha) * prev;
        result[i] = Some(prev);
    }

    IndicatorSeries::from_values(result)
}
