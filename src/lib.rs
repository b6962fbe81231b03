//! # HodlYield - Covered Call Yield & Risk Metrics
//!
//! Turns a raw options-chain snapshot (strikes, bid/ask, last trade, quoted
//! implied volatility) into a per-contract risk/yield profile for picking
//! covered calls.
//!
//! ## Key Components
//!
//! - **Black-Scholes**: European call price, delta and vega
//! - **IV Solver**: Newton-Raphson with bisection fallback
//! - **Premium Resolver**: mid > bid > ask > last trade > nothing
//! - **Metrics Pipeline**: annualized yield, OTM distance, volatility and delta
//!   per contract, each fallback recorded on the output
//! - **Data Fetching**: Yahoo Finance with a local TTL cache
//! - **Screening**: delta / yield / cost-basis flags for presentation
//!
//! ## Usage
//!
//! ```rust
//! use hodl_yield::prelude::*;
//!
//! let ctx = PricingContext::new(60.0, 30, 0.05).unwrap();
//! let quote = OptionQuote::new(65.0).unwrap().with_bid_ask(1.00, 1.20);
//!
//! let metrics = ChainMetricsPipeline::default()
//!     .compute_chain(&[quote], &ctx)
//!     .unwrap();
//!
//! assert_eq!(metrics[0].premium_source, PremiumSource::MidQuote);
//! assert!(metrics[0].delta > 0.0 && metrics[0].delta < 1.0);
//! ```
//!
//! ## What This Does NOT Do
//!
//! - Price puts or multi-leg strategies
//! - Adjust for early exercise or dividends (European approximation)

pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod pricing;
pub mod screen;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        CallChain, ChainRow, ContractMetrics, DeltaSource, OptionQuote, PremiumSource,
        PricingContext, SpotQuote, VolatilitySource, YieldError, YieldResult,
        DEFAULT_RISK_FREE_RATE,
    };

    // Models
    pub use crate::models::{
        delta as bs_delta, implied_volatility, norm_cdf, norm_pdf, price as bs_price,
        vega as bs_vega, ImpliedVolSolver, IvSolverConfig,
    };

    // Metrics engine
    pub use crate::pricing::{ChainMetricsPipeline, ContractMetricsCalculator, PremiumResolver};

    // Data fetching
    pub use crate::data::{
        resolve_risk_free_rate, CacheConfig, CachedFetcher, DataCache, MarketDataSource,
        YahooClient,
    };

    // Screening
    pub use crate::screen::{
        classify, rank_candidates, screen, RowFlag, ScreenConfig, ScreenedContract,
    };

    pub use crate::config::AppConfig;
}

// Re-export main types at crate root
pub use crate::core::{YieldError, YieldResult};
pub use crate::pricing::{ChainMetricsPipeline, ContractMetricsCalculator};
