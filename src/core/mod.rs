//! Core data types for HodlYield
//!
//! Defines fundamental types:
//! - OptionQuote / ChainRow: call quotes, validated and raw
//! - PricingContext: spot, days to expiration, risk-free rate
//! - ContractMetrics: per-contract yield and risk output
//! - YieldError: error taxonomy

pub mod context;
pub mod error;
pub mod metrics;
pub mod quote;

pub use context::*;
pub use error::*;
pub use metrics::*;
pub use quote::*;
