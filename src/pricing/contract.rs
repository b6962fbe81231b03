//! Per-contract metrics
//!
//! Resolves the premium, derives yield and moneyness, picks a volatility and
//! computes delta. Model failures never escape: each one routes to a named
//! fallback recorded on the output.

use crate::core::{
    ContractMetrics, DeltaSource, OptionQuote, PricingContext, VolatilitySource, DAYS_PER_YEAR,
};
use crate::models::{black_scholes, ImpliedVolSolver};

use super::premium::PremiumResolver;

#[derive(Debug, Clone, Default)]
pub struct ContractMetricsCalculator {
    solver: ImpliedVolSolver,
}

impl ContractMetricsCalculator {
    pub fn new(solver: ImpliedVolSolver) -> Self {
        Self { solver }
    }

    pub fn compute(&self, quote: &OptionQuote, ctx: &PricingContext) -> ContractMetrics {
        let spot = ctx.spot();
        let rate = ctx.risk_free_rate();
        let days = ctx.days_to_expiration();
        let strike = quote.strike;

        let (premium, premium_source) =
            PremiumResolver::resolve(quote.bid, quote.ask, quote.last_price);

        let static_return = premium / spot;
        let annualized_yield = static_return * DAYS_PER_YEAR / days as f64;
        let otm_fraction = (strike - spot) / spot;

        let (final_volatility, volatility_source) = self.select_volatility(quote, premium, ctx);

        let (delta, delta_source) = match final_volatility {
            Some(vol) => match black_scholes::delta(spot, strike, rate, days as f64, vol) {
                Ok(d) => (d, DeltaSource::Model),
                Err(e) => {
                    tracing::debug!(
                        strike,
                        vol,
                        error = %e,
                        "delta model failed, using moneyness"
                    );
                    (moneyness_delta(spot, strike), DeltaSource::MoneynessFallback)
                }
            },
            None => (moneyness_delta(spot, strike), DeltaSource::MoneynessFallback),
        };

        ContractMetrics {
            strike,
            bid: quote.bid,
            ask: quote.ask,
            last_price: quote.last_price,
            volume: quote.volume,
            open_interest: quote.open_interest,
            quoted_implied_vol: quote.implied_vol,
            days_to_expiration: days,
            premium,
            premium_source,
            static_return,
            annualized_yield,
            otm_fraction,
            final_volatility,
            volatility_source,
            delta,
            delta_source,
            probability_itm: delta,
        }
    }

    /// Solved IV when the premium carries time value, else the quoted IV, else none.
    fn select_volatility(
        &self,
        quote: &OptionQuote,
        premium: f64,
        ctx: &PricingContext,
    ) -> (Option<f64>, VolatilitySource) {
        let spot = ctx.spot();
        let intrinsic = quote.intrinsic(spot);

        if premium > intrinsic {
            match self.solver.solve(
                premium,
                spot,
                quote.strike,
                ctx.risk_free_rate(),
                ctx.days_to_expiration() as f64,
            ) {
                Ok(vol) => return (Some(vol), VolatilitySource::SolvedFromPremium),
                Err(e) => {
                    tracing::debug!(
                        strike = quote.strike,
                        premium,
                        error = %e,
                        "IV solve failed"
                    );
                }
            }
        }

        if quote.implied_vol > 0.0 && quote.implied_vol.is_finite() {
            (Some(quote.implied_vol), VolatilitySource::QuotedFallback)
        } else {
            (None, VolatilitySource::Unavailable)
        }
    }
}

/// Deep ITM calls almost surely finish in the money, deep OTM ones almost never.
fn moneyness_delta(spot: f64, strike: f64) -> f64 {
    if spot > strike {
        1.0
    } else {
        0.0
    }
}
