//! Per-contract output record
//!
//! Every degraded value carries the branch that produced it, so a consumer can
//! tell a model result from a heuristic fallback.

use serde::{Deserialize, Serialize};

/// Where the premium came from, in decreasing order of reliability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PremiumSource {
    /// Mid of a two-sided market
    MidQuote,
    BidOnly,
    AskOnly,
    /// Last trade, possibly stale
    LastTrade,
    /// No usable price; premium is zero
    NoQuote,
}

/// Where the volatility used for delta came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilitySource {
    /// Implied from the resolved premium
    SolvedFromPremium,
    /// Vendor-quoted implied volatility
    QuotedFallback,
    Unavailable,
}

/// How delta was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaSource {
    /// Black-Scholes N(d1)
    Model,
    /// 1 if spot > strike, else 0
    MoneynessFallback,
}

/// Risk/yield profile of one call contract.
///
/// `probability_itm` mirrors `delta`; delta is the usual proxy for the
/// probability of finishing in the money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractMetrics {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    pub last_price: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub quoted_implied_vol: f64,
    pub days_to_expiration: u32,

    pub premium: f64,
    pub premium_source: PremiumSource,
    /// premium / spot
    pub static_return: f64,
    /// static_return * 365 / days
    pub annualized_yield: f64,
    /// (strike - spot) / spot, negative when in the money
    pub otm_fraction: f64,
    /// Volatility used for delta, `None` when unavailable
    pub final_volatility: Option<f64>,
    pub volatility_source: VolatilitySource,
    pub delta: f64,
    pub delta_source: DeltaSource,
    pub probability_itm: f64,
}

impl ContractMetrics {
    /// Did both volatility and delta come out of the model?
    pub fn is_model_based(&self) -> bool {
        self.delta_source == DeltaSource::Model
            && self.volatility_source != VolatilitySource::Unavailable
    }

    pub fn has_premium(&self) -> bool {
        self.premium_source != PremiumSource::NoQuote && self.premium > 0.0
    }
}
