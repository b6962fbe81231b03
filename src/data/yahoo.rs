//! Yahoo Finance data fetcher
//!
//! Spot price, expiration list, call chain and the 13-week T-bill rate from
//! Yahoo Finance's unofficial API.
//!
//! Note: Yahoo Finance data is delayed ~15 minutes and intended for personal use.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::core::{CallChain, ChainRow, SpotQuote, YieldError, YieldResult};

/// 13-week Treasury bill yield index, quoted in percent
pub const RISK_FREE_SYMBOL: &str = "^IRX";

/// Market-data collaborator consumed by the metrics engine
pub trait MarketDataSource {
    /// Current price of the underlying
    fn spot_quote(&self, symbol: &str) -> YieldResult<SpotQuote>;

    /// Listed option expirations, ascending
    fn expirations(&self, symbol: &str) -> YieldResult<Vec<NaiveDate>>;

    /// Call rows for one expiration
    fn call_chain(&self, symbol: &str, expiry: NaiveDate) -> YieldResult<CallChain>;

    /// Risk-free rate as a fraction
    fn risk_free_rate(&self) -> YieldResult<f64>;
}

/// Risk-free rate from `source`, or `fallback` when it cannot be fetched.
pub fn resolve_risk_free_rate<S: MarketDataSource + ?Sized>(source: &S, fallback: f64) -> f64 {
    match source.risk_free_rate() {
        Ok(rate) if rate.is_finite() => rate,
        Ok(rate) => {
            tracing::warn!("Risk-free rate {} unusable, falling back to {}", rate, fallback);
            fallback
        }
        Err(e) => {
            tracing::warn!(
                "Failed to fetch risk-free rate: {}; falling back to {}",
                e,
                fallback
            );
            fallback
        }
    }
}

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> YieldResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| YieldError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://query1.finance.yahoo.com/v7/finance".to_string(),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, what: &str) -> YieldResult<T> {
        self.client
            .get(url)
            .send()
            .map_err(|e| YieldError::Network(e.to_string()))?
            .json()
            .map_err(|e| YieldError::data(format!("Failed to parse {}: {}", what, e)))
    }

    fn options_result(&self, url: &str) -> YieldResult<YahooOptionChainData> {
        let response: YahooOptionsResponse = self.get_json(url, "options")?;
        response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| YieldError::data("No options data returned"))
    }
}

impl MarketDataSource for YahooClient {
    fn spot_quote(&self, symbol: &str) -> YieldResult<SpotQuote> {
        let url = format!("{}/quote?symbols={}", self.base_url, symbol);
        let response: YahooQuoteResponse = self.get_json(&url, "quote")?;

        let result = response
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| YieldError::data(format!("No quote data returned for {symbol}")))?;

        let price = result
            .regular_market_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| YieldError::data(format!("No usable price for {symbol}")))?;

        Ok(SpotQuote {
            symbol: symbol.to_string(),
            price,
            bid: result.bid,
            ask: result.ask,
            timestamp: Utc::now(),
        })
    }

    fn expirations(&self, symbol: &str) -> YieldResult<Vec<NaiveDate>> {
        let url = format!("{}/options/{}", self.base_url, symbol);
        let chain = self.options_result(&url)?;

        let mut expiries: Vec<NaiveDate> = chain
            .expiration_dates
            .into_iter()
            .filter_map(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.date_naive())
            .collect();
        expiries.sort();
        expiries.dedup();

        Ok(expiries)
    }

    fn call_chain(&self, symbol: &str, expiry: NaiveDate) -> YieldResult<CallChain> {
        // Yahoo keys expirations by midnight UTC
        let expiry_ts = expiry
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| YieldError::data(format!("Invalid expiry {expiry}")))?
            .and_utc()
            .timestamp();

        let url = format!("{}/options/{}?date={}", self.base_url, symbol, expiry_ts);
        let data = self.options_result(&url)?;

        let mut chain = CallChain::new(symbol, expiry);
        chain.spot = data.quote.regular_market_price;
        if let Some(options) = data.options.into_iter().next() {
            chain.calls = options.calls;
        }

        tracing::info!("Fetched {} calls for {} {}", chain.calls.len(), symbol, expiry);
        Ok(chain)
    }

    fn risk_free_rate(&self) -> YieldResult<f64> {
        let quote = self.spot_quote(RISK_FREE_SYMBOL)?;
        Ok(quote.price / 100.0)
    }
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResult,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResult {
    result: Vec<YahooQuoteData>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteData {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    result: Vec<YahooOptionChainData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    quote: YahooQuoteData,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<ChainRow>,
}
