//! Property-based tests using proptest.
//!
//! Invariants of the pricing model, the IV solver and the metrics calculator
//! across random market inputs.

use proptest::prelude::*;

use hodl_yield::core::{OptionQuote, PricingContext, YieldError};
use hodl_yield::models::{black_scholes, implied_volatility};
use hodl_yield::pricing::ContractMetricsCalculator;

proptest! {
    /// Call delta always lies in [0, 1].
    #[test]
    fn delta_is_bounded(
        spot in 1.0_f64..500.0,
        moneyness in 0.3_f64..3.0,
        rate in -0.01_f64..0.10,
        days in 1.0_f64..730.0,
        vol in 0.01_f64..3.0,
    ) {
        let strike = spot * moneyness;
        let d = black_scholes::delta(spot, strike, rate, days, vol).unwrap();
        prop_assert!((0.0..=1.0).contains(&d), "delta {} out of range", d);
    }
}

proptest! {
    /// Price never decreases as volatility rises (vega >= 0).
    #[test]
    fn price_non_decreasing_in_vol(
        spot in 10.0_f64..200.0,
        moneyness in 0.5_f64..2.0,
        days in 1.0_f64..365.0,
        vol in 0.05_f64..2.0,
        bump in 0.001_f64..0.5,
    ) {
        let strike = spot * moneyness;
        let low = black_scholes::price(spot, strike, 0.045, days, vol).unwrap();
        let high = black_scholes::price(spot, strike, 0.045, days, vol + bump).unwrap();
        prop_assert!(high >= low - 1e-10, "price fell from {} to {}", low, high);

        let vega = black_scholes::vega(spot, strike, 0.045, days, vol).unwrap();
        prop_assert!(vega >= 0.0);
    }
}

proptest! {
    /// Price never increases as strike rises.
    #[test]
    fn price_non_increasing_in_strike(
        spot in 10.0_f64..200.0,
        moneyness in 0.5_f64..2.0,
        step in 0.01_f64..20.0,
        days in 1.0_f64..365.0,
        vol in 0.05_f64..2.0,
    ) {
        let strike = spot * moneyness;
        let near = black_scholes::price(spot, strike, 0.045, days, vol).unwrap();
        let far = black_scholes::price(spot, strike + step, 0.045, days, vol).unwrap();
        prop_assert!(far <= near + 1e-10, "price rose from {} to {}", near, far);
    }
}

proptest! {
    /// Pricing then solving recovers the volatility.
    #[test]
    fn implied_vol_round_trip(
        strike in 70.0_f64..140.0,
        days in 7.0_f64..365.0,
        vol in 0.05_f64..2.0,
        rate in 0.0_f64..0.08,
    ) {
        let spot = 100.0;
        let vega = black_scholes::vega(spot, strike, rate, days, vol).unwrap();
        let p = black_scholes::price(spot, strike, rate, days, vol).unwrap();

        // Flat regions carry no volatility information
        prop_assume!(vega > 1e-2);
        prop_assume!(p > (spot - strike).max(0.0) + 1e-6);

        let iv = implied_volatility(p, spot, strike, rate, days).unwrap();
        prop_assert!(iv > 0.0);
        prop_assert!((iv - vol).abs() < 1e-3, "recovered {} for {}", iv, vol);
    }
}

proptest! {
    /// No premium at or below intrinsic value implies a volatility.
    #[test]
    fn no_solution_at_or_below_intrinsic(
        spot in 10.0_f64..200.0,
        moneyness in 0.3_f64..2.0,
        fraction in 0.0_f64..=1.0,
        days in 1.0_f64..365.0,
    ) {
        let strike = spot * moneyness;
        let intrinsic = (spot - strike).max(0.0);
        let observed = intrinsic * fraction;
        let err = implied_volatility(observed, spot, strike, 0.045, days).unwrap_err();
        prop_assert!(matches!(err, YieldError::NoSolutionFound(_)));
    }
}

proptest! {
    /// Identical inputs always produce identical metrics.
    #[test]
    fn compute_is_deterministic(
        strike in 20.0_f64..120.0,
        bid in 0.0_f64..10.0,
        ask in 0.0_f64..12.0,
        last in 0.0_f64..10.0,
        quoted_iv in 0.0_f64..2.0,
        days in -5_i64..400,
    ) {
        let quote = OptionQuote::new(strike)
            .unwrap()
            .with_bid_ask(bid, ask)
            .with_last_price(last)
            .with_implied_vol(quoted_iv);
        let ctx = PricingContext::new(60.0, days, 0.045).unwrap();
        let calc = ContractMetricsCalculator::default();

        let first = calc.compute(&quote, &ctx);
        let second = calc.compute(&quote, &ctx);

        prop_assert_eq!(first.delta.to_bits(), second.delta.to_bits());
        prop_assert_eq!(first.annualized_yield.to_bits(), second.annualized_yield.to_bits());
        prop_assert_eq!(&first, &second);
        prop_assert!((0.0..=1.0).contains(&first.delta));
        prop_assert_eq!(first.delta, first.probability_itm);
        if let Some(vol) = first.final_volatility {
            prop_assert!(vol > 0.0);
        }
    }
}
