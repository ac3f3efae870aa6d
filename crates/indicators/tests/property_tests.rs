//! Property tests for indicator invariants.
//!
//! Uses proptest to verify:
//! 1. Purity: the same input always produces the same output
//! 2. Domains: RSI and stochastic stay within [0, 100]
//! 3. Short inputs read as "insufficient data", never panic

use core_types::Bar;
use indicators::{atr, closes, macd, momentum, rsi, stochastic, supertrend};
use proptest::prelude::*;

fn arb_bars(min: usize, max: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((1.0..2.0_f64, 0.0..0.05_f64, 0.0..0.05_f64), min..max).prop_map(
        |raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (close, up, down))| Bar {
                    open: close,
                    high: close + up,
                    low: close - down,
                    close,
                    volume: 1_000.0,
                    timestamp: i as i64 * 60,
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn indicators_are_idempotent(bars in arb_bars(40, 120)) {
        let c = closes(&bars);
        prop_assert_eq!(rsi(&c, 14), rsi(&c, 14));
        prop_assert_eq!(macd(&c, 12, 26, 9), macd(&c, 12, 26, 9));
        prop_assert_eq!(stochastic(&bars, 14, 3), stochastic(&bars, 14, 3));
        prop_assert_eq!(supertrend(&bars, 10, 3.0), supertrend(&bars, 10, 3.0));
    }

    #[test]
    fn oscillators_stay_in_range(bars in arb_bars(40, 120)) {
        let c = closes(&bars);
        let r = rsi(&c, 10).unwrap();
        prop_assert!((0.0..=100.0).contains(&r));
        let s = stochastic(&bars, 14, 3).unwrap();
        for v in [s.k, s.d, s.prev_k, s.prev_d] {
            prop_assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn short_inputs_are_insufficient(bars in arb_bars(0, 10)) {
        let c = closes(&bars);
        prop_assert!(rsi(&c, 10).is_none());
        prop_assert!(macd(&c, 12, 26, 9).is_none());
        prop_assert!(stochastic(&bars, 14, 3).is_none());
        prop_assert!(atr(&bars, 14).is_none());
        prop_assert!(momentum(&c, 10).is_none());
        prop_assert!(supertrend(&bars, 10, 3.0).is_none());
    }
}
