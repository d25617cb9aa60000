//! Moving Average Convergence/Divergence.
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(line, signal_period),
//! histogram = line - signal. Positions stay `None` until every constituent
//! EMA is defined.

use super::{closes, ema_of_series, IndicatorSeries};
use crate::{Period, Result, SetupError, OHLCV};

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Period,
    slow: Period,
    signal: Period,
}

/// Full aligned MACD output.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// MACD values at a single bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: Period::new_const(12),
            slow: Period::new_const(26),
            signal: Period::new_const(9),
        }
    }
}

impl Macd {
    pub fn new(fast: Period, slow: Period, signal: Period) -> Result<Self> {
        if fast >= slow {
            return Err(SetupError::InvalidConfig(format!(
                "MACD fast period {} must be shorter than slow period {}",
                fast.get(),
                slow.get()
            )));
        }
        Ok(Self { fast, slow, signal })
    }

    /// Index of the first bar with a defined histogram.
    pub fn lookback(&self) -> usize {
        self.slow.get() + self.signal.get() - 2
    }

    pub fn compute<T: OHLCV>(&self, bars: &[T]) -> MacdSeries {
        let closes = closes(bars);
        let fast = ema_of_series(&closes, self.fast.get());
        let slow = ema_of_series(&closes, self.slow.get());

        let line: IndicatorSeries = fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| Some(f? - s?))
            .collect();
        let signal = ema_of_series(line.as_slice(), self.signal.get());
        let histogram = line
            .iter()
            .zip(signal.iter())
            .map(|(l, s)| Some(l? - s?))
            .collect();

        MacdSeries {
            line,
            signal,
            histogram,
        }
    }

    pub fn current<T: OHLCV>(&self, bars: &[T]) -> Option<MacdPoint> {
        self.compute(bars).point(bars.len().checked_sub(1)?)
    }
}

impl MacdSeries {
    pub fn point(&self, index: usize) -> Option<MacdPoint> {
        Some(MacdPoint {
            line: self.line.get(index)?,
            signal: self.signal.get(index)?,
            histogram: self.histogram.get(index)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_approx, make_bars};

    #[test]
    fn macd_warm_up_positions() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let macd = Macd::default().compute(&bars);

        assert_eq!(macd.line.first_defined(), Some(25));
        assert_eq!(macd.signal.first_defined(), Some(33));
        assert_eq!(macd.histogram.first_defined(), Some(33));
        assert_eq!(Macd::default().lookback(), 33);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.2)
            .collect();
        let bars = make_bars(&closes);
        let macd = Macd::default().compute(&bars);
        for i in 33..80 {
            let p = macd.point(i).unwrap();
            assert_approx(p.histogram, p.line - p.signal, 1e-12);
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let bars = make_bars(&closes);
        let point = Macd::default().current(&bars).unwrap();
        assert!(point.line > 0.0);
    }

    #[test]
    fn macd_insufficient_data() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        assert!(Macd::default().current(&bars).is_none());
        let empty: Vec<crate::Candle> = Vec::new();
        assert!(Macd::default().current(&empty).is_none());
    }

    #[test]
    fn macd_rejects_inverted_periods() {
        let result = Macd::new(
            Period::new(26).unwrap(),
            Period::new(12).unwrap(),
            Period::new(9).unwrap(),
        );
        assert!(result.is_err());
    }
}
