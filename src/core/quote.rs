//! Option quote data
//!
//! Raw chain rows as delivered by the market-data side, and the validated
//! `OptionQuote` the pricing engine consumes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::{YieldError, YieldResult};

/// A single call quote, validated and immutable once built.
///
/// Prices are non-negative, volatility is a fraction (0.35 = 35%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Strike price
    pub strike: f64,
    /// Bid price
    pub bid: f64,
    /// Ask price
    pub ask: f64,
    /// Last traded price
    pub last_price: f64,
    /// Trading volume
    pub volume: u64,
    /// Open interest
    pub open_interest: u64,
    /// Implied volatility quoted by the exchange/vendor
    pub implied_vol: f64,
    /// Contract symbol (vendor-specific)
    pub contract_symbol: Option<String>,
}

impl OptionQuote {
    /// Create a quote with no market data at the given strike
    pub fn new(strike: f64) -> YieldResult<Self> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(YieldError::malformed_chain(format!(
                "strike must be positive and finite, got {strike}"
            )));
        }

        Ok(Self {
            strike,
            bid: 0.0,
            ask: 0.0,
            last_price: 0.0,
            volume: 0,
            open_interest: 0,
            implied_vol: 0.0,
            contract_symbol: None,
        })
    }

    /// Set bid and ask (negative or NaN values are treated as absent)
    pub fn with_bid_ask(mut self, bid: f64, ask: f64) -> Self {
        self.bid = non_negative(Some(bid));
        self.ask = non_negative(Some(ask));
        self
    }

    pub fn with_last_price(mut self, last: f64) -> Self {
        self.last_price = non_negative(Some(last));
        self
    }

    pub fn with_implied_vol(mut self, vol: f64) -> Self {
        self.implied_vol = non_negative(Some(vol));
        self
    }

    pub fn with_activity(mut self, volume: u64, open_interest: u64) -> Self {
        self.volume = volume;
        self.open_interest = open_interest;
        self
    }

    /// Intrinsic value of the call at the given spot
    pub fn intrinsic(&self, spot: f64) -> f64 {
        (spot - self.strike).max(0.0)
    }

    /// Is the call in the money?
    pub fn is_itm(&self, spot: f64) -> bool {
        spot > self.strike
    }

    /// Bid-ask spread, when both sides are quoted
    pub fn spread(&self) -> Option<f64> {
        if self.bid > 0.0 && self.ask > 0.0 {
            Some(self.ask - self.bid)
        } else {
            None
        }
    }
}

/// Missing, NaN and negative values collapse to zero
fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Counts arrive as floats from some exporters; fractions are truncated
fn non_negative_count(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Raw chain row, field names as served by Yahoo Finance.
///
/// Every field may be missing; only the strike is required to build a quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRow {
    #[serde(default)]
    pub contract_symbol: Option<String>,
    #[serde(default)]
    pub strike: Option<f64>,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub open_interest: Option<f64>,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
}

impl TryFrom<&ChainRow> for OptionQuote {
    type Error = YieldError;

    fn try_from(row: &ChainRow) -> YieldResult<Self> {
        let strike = row
            .strike
            .ok_or_else(|| YieldError::malformed_chain("row has no strike"))?;

        let mut quote = OptionQuote::new(strike)?;
        quote.bid = non_negative(row.bid);
        quote.ask = non_negative(row.ask);
        quote.last_price = non_negative(row.last_price);
        quote.volume = non_negative_count(row.volume);
        quote.open_interest = non_negative_count(row.open_interest);
        quote.implied_vol = non_negative(row.implied_volatility);
        quote.contract_symbol = row.contract_symbol.clone();

        Ok(quote)
    }
}

/// Call chain for a single expiration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallChain {
    /// Underlying symbol
    pub underlying: String,
    /// Expiration date
    pub expiry: NaiveDate,
    /// Underlying price reported alongside the chain, if any
    #[serde(default)]
    pub spot: Option<f64>,
    /// Call rows in vendor order
    pub calls: Vec<ChainRow>,
}

impl CallChain {
    pub fn new(underlying: impl Into<String>, expiry: NaiveDate) -> Self {
        Self {
            underlying: underlying.into(),
            expiry,
            spot: None,
            calls: Vec::new(),
        }
    }

    /// Strikes present in the chain, in row order
    pub fn strikes(&self) -> Vec<f64> {
        self.calls.iter().filter_map(|r| r.strike).collect()
    }
}

/// Spot price quote for the underlying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotQuote {
    pub symbol: String,
    pub price: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub timestamp: DateTime<Utc>,
}
