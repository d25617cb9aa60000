//! Directional movement (DI+ / DI-).
//!
//! +DM = up-move when it exceeds the down-move and is positive, else 0
//! (mirror for -DM). TR, +DM and -DM are smoothed with Wilder's running sum
//! `s[i] = s[i-1] - s[i-1] / length + x[i]`, starting from bar 0 where TR is
//! the bar range and both DMs are zero. DI = 100 * smoothed DM / smoothed TR.

use crate::{OHLCVExt, Period, OHLCV};

/// DI+ and DI- at one bar, both in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiPoint {
    pub plus: f64,
    pub minus: f64,
}

#[derive(Debug, Clone)]
pub struct DirectionalMovement {
    length: Period,
}

impl DirectionalMovement {
    pub fn new(length: Period) -> Self {
        Self { length }
    }

    /// DI+/DI- for every bar. Values exist from bar 0 but only settle after
    /// roughly `length` bars.
    pub fn compute<T: OHLCV>(&self, bars: &[T]) -> Vec<DiPoint> {
        let length = self.length.get() as f64;
        let mut smoothed_tr = 0.0;
        let mut smoothed_plus = 0.0;
        let mut smoothed_minus = 0.0;

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let (tr, plus_dm, minus_dm) = match i.checked_sub(1).map(|p| &bars[p]) {
                    None => (bar.range(), 0.0, 0.0),
                    Some(prev) => {
                        let up = bar.high() - prev.high();
                        let down = prev.low() - bar.low();
                        (
                            bar.true_range(Some(prev.close())),
                            if up > down && up > 0.0 { up } else { 0.0 },
                            if down > up && down > 0.0 { down } else { 0.0 },
                        )
                    }
                };

                smoothed_tr = smoothed_tr - smoothed_tr / length + tr;
                smoothed_plus = smoothed_plus - smoothed_plus / length + plus_dm;
                smoothed_minus = smoothed_minus - smoothed_minus / length + minus_dm;

                if smoothed_tr > 0.0 {
                    DiPoint {
                        plus: 100.0 * smoothed_plus / smoothed_tr,
                        minus: 100.0 * smoothed_minus / smoothed_tr,
                    }
                } else {
                    DiPoint::default()
                }
            })
            .collect()
    }
}
