//! Black-Scholes Model
//!
//! Provides:
//! - European call pricing
//! - Call delta and vega
//!
//! No dividend term. Volatility and rate are fractions (0.35 = 35%), time is
//! given in days and converted to years on a 365-day basis.

use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;

use crate::core::{YieldError, YieldResult, DAYS_PER_YEAR};

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter (time in years)
pub fn d1(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter (time in years)
pub fn d2(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, vol, time) - vol * time.sqrt()
}

/// Reject inputs for which the closed form is undefined; returns time in years.
fn checked_years(spot: f64, strike: f64, rate: f64, days: f64, vol: f64) -> YieldResult<f64> {
    let checks = [
        ("spot", spot),
        ("strike", strike),
        ("days to expiry", days),
        ("volatility", vol),
    ];
    for (name, value) in checks {
        if !value.is_finite() || value <= 0.0 {
            return Err(YieldError::invalid_pricing_input(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
    }
    if !rate.is_finite() {
        return Err(YieldError::invalid_pricing_input(format!(
            "rate must be finite, got {rate}"
        )));
    }
    Ok(days / DAYS_PER_YEAR)
}

/// European call price
pub fn price(spot: f64, strike: f64, rate: f64, days: f64, vol: f64) -> YieldResult<f64> {
    let time = checked_years(spot, strike, rate, days, vol)?;

    let d1 = d1(spot, strike, rate, vol, time);
    let d2 = d2(spot, strike, rate, vol, time);
    let df = (-rate * time).exp();

    Ok((spot * norm_cdf(d1) - strike * df * norm_cdf(d2)).max(0.0))
}

/// Call delta, N(d1), in [0, 1]
pub fn delta(spot: f64, strike: f64, rate: f64, days: f64, vol: f64) -> YieldResult<f64> {
    let time = checked_years(spot, strike, rate, days, vol)?;
    Ok(norm_cdf(d1(spot, strike, rate, vol, time)).clamp(0.0, 1.0))
}

/// Vega per unit of volatility (not per 1%)
pub fn vega(spot: f64, strike: f64, rate: f64, days: f64, vol: f64) -> YieldResult<f64> {
    let time = checked_years(spot, strike, rate, days, vol)?;
    Ok(spot * norm_pdf(d1(spot, strike, rate, vol, time)) * time.sqrt())
}
