//! Metrics engine
//!
//! - PremiumResolver: usable premium from bid/ask/last
//! - ContractMetricsCalculator: yield, moneyness, volatility and delta per contract
//! - ChainMetricsPipeline: the calculator applied across an expiration

pub mod chain;
pub mod contract;
pub mod premium;

pub use chain::*;
pub use contract::*;
pub use premium::*;
