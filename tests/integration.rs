//! Scenario tests for the metrics engine, end to end through the public API.

use approx::assert_abs_diff_eq;

use hodl_yield::prelude::*;

#[test]
fn otm_call_with_two_sided_market() {
    let ctx = PricingContext::new(60.0, 30, 0.05).unwrap();
    let quote = OptionQuote::new(65.0).unwrap().with_bid_ask(1.00, 1.20);

    let m = ContractMetricsCalculator::default().compute(&quote, &ctx);

    assert_abs_diff_eq!(m.premium, 1.10, epsilon = 1e-12);
    assert_eq!(m.premium_source, PremiumSource::MidQuote);
    assert_abs_diff_eq!(m.static_return, 1.10 / 60.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m.annualized_yield, (1.10 / 60.0) * (365.0 / 30.0), epsilon = 1e-12);
    assert_abs_diff_eq!(m.annualized_yield, 0.223, epsilon = 1e-3);

    assert_eq!(m.volatility_source, VolatilitySource::SolvedFromPremium);
    let vol = m.final_volatility.unwrap();
    assert!(vol > 0.0);

    // The solved volatility reprices the premium
    let repriced = bs_price(60.0, 65.0, 0.05, 30.0, vol).unwrap();
    assert_abs_diff_eq!(repriced, 1.10, epsilon = 1e-6);

    let expected_delta = bs_delta(60.0, 65.0, 0.05, 30.0, vol).unwrap();
    assert_eq!(m.delta, expected_delta);
    assert!(m.delta > 0.0 && m.delta < 1.0);
    assert_eq!(m.probability_itm, m.delta);
    assert!(m.is_model_based());
}

#[test]
fn deep_itm_without_quotes_uses_moneyness() {
    let ctx = PricingContext::new(100.0, 30, 0.05).unwrap();
    let quote = OptionQuote::new(50.0).unwrap();

    let m = ContractMetricsCalculator::default().compute(&quote, &ctx);

    assert_eq!(m.premium, 0.0);
    assert_eq!(m.premium_source, PremiumSource::NoQuote);
    assert_eq!(m.volatility_source, VolatilitySource::Unavailable);
    assert_eq!(m.final_volatility, None);
    assert_eq!(m.delta, 1.0);
    assert_eq!(m.delta_source, DeltaSource::MoneynessFallback);
    assert_eq!(m.probability_itm, 1.0);
    assert_abs_diff_eq!(m.otm_fraction, -0.5, epsilon = 1e-12);
    assert!(!m.is_model_based());
    assert!(!m.has_premium());
}

#[test]
fn solver_recovers_volatility_behind_premium() {
    let ctx = PricingContext::new(48.5, 21, 0.045).unwrap();
    let premium = bs_price(48.5, 52.0, 0.045, 21.0, 0.58).unwrap();
    let quote = OptionQuote::new(52.0).unwrap().with_last_price(premium);

    let m = ContractMetricsCalculator::default().compute(&quote, &ctx);

    assert_eq!(m.premium_source, PremiumSource::LastTrade);
    assert_eq!(m.volatility_source, VolatilitySource::SolvedFromPremium);
    assert_abs_diff_eq!(m.final_volatility.unwrap(), 0.58, epsilon = 1e-6);
}

#[test]
fn stale_itm_trade_falls_back_to_quoted_iv() {
    // Last trade below intrinsic: no time value to invert
    let ctx = PricingContext::new(60.0, 45, 0.045).unwrap();
    let quote = OptionQuote::new(45.0)
        .unwrap()
        .with_last_price(12.0)
        .with_implied_vol(0.72);

    let m = ContractMetricsCalculator::default().compute(&quote, &ctx);

    assert_eq!(m.volatility_source, VolatilitySource::QuotedFallback);
    assert_eq!(m.final_volatility, Some(0.72));
    assert_eq!(m.delta_source, DeltaSource::Model);
    assert_eq!(m.delta, bs_delta(60.0, 45.0, 0.045, 45.0, 0.72).unwrap());
}

#[test]
fn snapshot_chain_through_pipeline_and_screen() {
    let json = r#"{
        "underlying": "IBIT",
        "expiry": "2025-02-21",
        "spot": 60.0,
        "calls": [
            {"strike": 40.0, "bid": 19.8, "ask": 20.6, "impliedVolatility": 1.1},
            {"strike": 55.0, "bid": 6.1, "ask": 6.4, "impliedVolatility": 0.6},
            {"strike": 62.0, "bid": 1.9, "ask": 2.05, "impliedVolatility": 0.55},
            {"strike": 66.0, "bid": 0.95, "ask": 1.05, "impliedVolatility": 0.55},
            {"strike": 75.0, "bid": 0.0, "ask": 0.25, "impliedVolatility": 0.6},
            {"strike": 90.0}
        ]
    }"#;
    let chain: CallChain = serde_json::from_str(json).unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2025, 1, 22).unwrap();
    let ctx = PricingContext::for_expiry(chain.spot.unwrap(), chain.expiry, today, 0.045).unwrap();
    assert_eq!(ctx.days_to_expiration(), 30);

    let metrics = AppConfig::default()
        .pipeline()
        .unwrap()
        .compute_rows(&chain.calls, &ctx)
        .unwrap();

    assert_eq!(metrics.len(), chain.calls.len());
    let strikes: Vec<f64> = metrics.iter().map(|m| m.strike).collect();
    assert_eq!(strikes, chain.strikes());

    assert_eq!(metrics[4].premium_source, PremiumSource::AskOnly);
    assert_eq!(metrics[5].premium_source, PremiumSource::NoQuote);
    assert_eq!(metrics[5].delta, 0.0);

    // Deltas fall as strikes rise
    for pair in metrics.windows(2) {
        assert!(pair[1].delta <= pair[0].delta);
    }

    let config = ScreenConfig {
        cost_basis: Some(58.0),
        ..Default::default()
    };
    let screened = screen(&metrics, 60.0, &config);

    // 40 strike is outside the 80% window
    assert_eq!(screened.len(), 5);
    assert_eq!(screened[0].flag, RowFlag::BelowCostBasis);
    assert_eq!(screened[1].flag, RowFlag::ExceedsMaxDelta);

    for row in rank_candidates(&screened) {
        assert!(row.metrics.delta <= config.max_delta);
        assert!(row.metrics.annualized_yield >= config.min_annualized_yield);
    }
}

#[test]
fn parallel_pipeline_preserves_order() {
    let ctx = PricingContext::new(60.0, 14, 0.045).unwrap();
    let quotes: Vec<OptionQuote> = (0..200)
        .map(|i| {
            let strike = 30.0 + i as f64 * 0.5;
            OptionQuote::new(strike)
                .unwrap()
                .with_bid_ask((60.0 - strike).max(0.0) + 0.5, (60.0 - strike).max(0.0) + 0.6)
                .with_implied_vol(0.5)
        })
        .collect();

    let sequential = ChainMetricsPipeline::default().compute_chain(&quotes, &ctx).unwrap();
    let parallel = ChainMetricsPipeline::default()
        .parallel(true)
        .compute_chain(&quotes, &ctx)
        .unwrap();

    assert_eq!(sequential, parallel);
    for (q, m) in quotes.iter().zip(&parallel) {
        assert_eq!(q.strike, m.strike);
    }
}

#[test]
fn empty_chain_is_reported() {
    let ctx = PricingContext::new(60.0, 14, 0.045).unwrap();
    let err = ChainMetricsPipeline::default().compute_chain(&[], &ctx).unwrap_err();
    assert!(matches!(err, YieldError::MalformedChainData(_)));
}
