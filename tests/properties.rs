//! Property tests over generated candle series.

use proptest::prelude::*;
use setupscan::prelude::*;

/// Walk of close-to-close changes with a spread around each body
fn bars_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec((-3.0f64..3.0, 0.1f64..2.0), min..max).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (change, spread))| {
                let open = price;
                let close = (price + change).max(1.0);
                price = close;
                Candle::new(
                    i as i64,
                    open,
                    open.max(close) + spread,
                    open.min(close) - spread,
                    close,
                    1000.0,
                )
            })
            .collect()
    })
}

/// Strictly ascending closes with constant high/low offsets
fn ascending_strategy() -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec(0.1f64..5.0, 11..60).prop_map(|steps| {
        let mut close = 100.0;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                close += step;
                Candle::new(i as i64, close - step / 2.0, close + 1.0, close - 1.0, close, 1000.0)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn intensity_is_bounded(
        bars in bars_strategy(11, 150),
        collect in 1usize..150,
        gamma in 0.1f64..4.0,
    ) {
        let pulse = MysticPulse::new(Period::new(9).unwrap(), Period::new(collect).unwrap(), gamma)
            .unwrap();
        for result in pulse.series(&bars).into_iter().flatten() {
            prop_assert!((0.0..=1.0).contains(&result.intensity));
            prop_assert!(result.di_plus >= 0.0 && result.di_minus >= 0.0);
            prop_assert_eq!(result.is_bullish, result.trend_score > 0);
        }
    }

    #[test]
    fn ascending_series_is_bullish(bars in ascending_strategy()) {
        let result = MysticPulse::default().current(&bars).unwrap();
        prop_assert!(result.di_plus > result.di_minus);
        prop_assert!(result.trend_score > 0);
        prop_assert!(result.is_bullish);
    }

    #[test]
    fn descending_series_is_bearish(bars in ascending_strategy()) {
        let mirrored: Vec<Candle> = bars
            .iter()
            .map(|b| {
                Candle::new(b.time, 1000.0 - b.open, 1000.0 - b.low, 1000.0 - b.high, 1000.0 - b.close, b.volume)
            })
            .collect();
        let result = MysticPulse::default().current(&mirrored).unwrap();
        prop_assert!(result.di_minus > result.di_plus);
        prop_assert!(result.trend_score < 0);
    }

    #[test]
    fn short_series_yield_nothing(bars in bars_strategy(0, 10)) {
        prop_assert!(MysticPulseDetector::with_defaults()
            .detect("PETR4", &bars, Trend::Sideways, Volatility::Medium, 0.0)
            .is_none());
        prop_assert!(Setup123Detector::with_defaults().detect("PETR4", &bars).is_none());
    }

    #[test]
    fn setup_123_points_are_consecutive(bars in bars_strategy(80, 260)) {
        if let Some(p) = Setup123Detector::with_defaults().find_pattern(&bars) {
            prop_assert_eq!(p.p2_index, p.p1_index + 1);
            prop_assert_eq!(p.p3_index, p.p2_index + 1);
        }
    }

    #[test]
    fn history_outcomes_close(bars in bars_strategy(80, 300)) {
        let signals = detect_all_setup_123("PETR4", &bars, "1d");
        let stats = calculate_signal_stats(&signals);
        prop_assert_eq!(stats.total(), signals.len());
        for s in &signals {
            prop_assert_eq!(s.outcome.is_terminal(), s.resolved_index.is_some());
        }
    }

    #[test]
    fn counter_trend_is_always_high_risk(
        bars in ascending_strategy(),
        volatility in prop_oneof![Just(Volatility::Low), Just(Volatility::Medium), Just(Volatility::High)],
    ) {
        // ascending closes need 15 bars for ATR(14)
        prop_assume!(bars.len() >= 15);
        let result = MysticPulseDetector::with_defaults()
            .detect("PETR4", &bars, Trend::Down, volatility, 0.0)
            .unwrap();
        prop_assert_eq!(result.direction, Direction::Long);
        prop_assert_eq!(result.risk, RiskLevel::High);
    }
}
