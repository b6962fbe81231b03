//! Pricing Models
//!
//! Implements:
//! - Black-Scholes (European call price, delta, vega)
//! - Implied volatility solver (Newton-Raphson with bisection fallback)

pub mod black_scholes;
pub mod implied_vol;

pub use black_scholes::*;
pub use implied_vol::*;
