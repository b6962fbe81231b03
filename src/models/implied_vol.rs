//! Implied volatility solver
//!
//! Newton-Raphson on the Black-Scholes call price with analytic vega, falling
//! back to bisection over a bounded volatility range when Newton leaves the
//! range, stalls on a flat vega, or fails to converge.

use serde::{Deserialize, Serialize};

use super::black_scholes;
use crate::core::{YieldError, YieldResult};

/// Smallest bracket width at which bisection accepts its midpoint
const BRACKET_WIDTH_TOL: f64 = 1e-12;

/// Vega below which a Newton step is not attempted
const MIN_VEGA: f64 = 1e-12;

/// Solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IvSolverConfig {
    /// Newton seed volatility
    pub initial_guess: f64,
    /// Absolute price tolerance
    pub tolerance: f64,
    /// Iteration budget, applied to each phase
    pub max_iterations: usize,
    /// Lower volatility bound
    pub min_vol: f64,
    /// Upper volatility bound
    pub max_vol: f64,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.3,
            tolerance: 1e-8,
            max_iterations: 100,
            min_vol: 0.001,
            max_vol: 5.0,
        }
    }
}

impl IvSolverConfig {
    pub fn validate(&self) -> YieldResult<()> {
        if !(self.min_vol > 0.0 && self.min_vol < self.max_vol && self.max_vol.is_finite()) {
            return Err(YieldError::config(format!(
                "volatility bounds must satisfy 0 < min_vol < max_vol, got [{}, {}]",
                self.min_vol, self.max_vol
            )));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(YieldError::config(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(YieldError::config("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

/// Recovers call volatility from an observed premium
#[derive(Debug, Clone, Default)]
pub struct ImpliedVolSolver {
    config: IvSolverConfig,
}

impl ImpliedVolSolver {
    pub fn new(config: IvSolverConfig) -> YieldResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IvSolverConfig {
        &self.config
    }

    /// Volatility that reprices the call at `observed_price`.
    ///
    /// Fails with `NoSolutionFound` when the price does not exceed intrinsic
    /// value `max(0, spot - strike)`, when it lies outside the prices reachable
    /// within the volatility bounds, or when the iteration budget runs out.
    /// The returned volatility is always strictly positive.
    pub fn solve(
        &self,
        observed_price: f64,
        spot: f64,
        strike: f64,
        rate: f64,
        days: f64,
    ) -> YieldResult<f64> {
        let intrinsic = (spot - strike).max(0.0);
        if !observed_price.is_finite() || observed_price <= intrinsic {
            return Err(YieldError::no_solution(format!(
                "premium {observed_price} does not exceed intrinsic value {intrinsic}"
            )));
        }

        let cfg = &self.config;
        let mut vol = cfg.initial_guess.clamp(cfg.min_vol, cfg.max_vol);

        for _ in 0..cfg.max_iterations {
            let diff = black_scholes::price(spot, strike, rate, days, vol)? - observed_price;
            if diff.abs() < cfg.tolerance {
                return Ok(vol);
            }

            let vega = black_scholes::vega(spot, strike, rate, days, vol)?;
            if vega < MIN_VEGA {
                break;
            }

            let next = vol - diff / vega;
            if !next.is_finite() || next < cfg.min_vol || next > cfg.max_vol {
                break;
            }
            vol = next;
        }

        self.bisect(observed_price, spot, strike, rate, days)
    }

    fn bisect(
        &self,
        observed_price: f64,
        spot: f64,
        strike: f64,
        rate: f64,
        days: f64,
    ) -> YieldResult<f64> {
        let cfg = &self.config;
        let mut low = cfg.min_vol;
        let mut high = cfg.max_vol;

        let low_price = black_scholes::price(spot, strike, rate, days, low)?;
        let high_price = black_scholes::price(spot, strike, rate, days, high)?;

        if (low_price - observed_price).abs() < cfg.tolerance {
            return Ok(low);
        }
        if (high_price - observed_price).abs() < cfg.tolerance {
            return Ok(high);
        }
        if observed_price < low_price || observed_price > high_price {
            return Err(YieldError::no_solution(format!(
                "premium {observed_price} outside attainable range [{low_price}, {high_price}]"
            )));
        }

        for _ in 0..cfg.max_iterations {
            let mid = 0.5 * (low + high);
            let diff = black_scholes::price(spot, strike, rate, days, mid)? - observed_price;

            if diff.abs() < cfg.tolerance || (high - low) < BRACKET_WIDTH_TOL {
                return Ok(mid);
            }

            if diff > 0.0 {
                high = mid;
            } else {
                low = mid;
            }
        }

        Err(YieldError::no_solution(format!(
            "no convergence within {} iterations",
            cfg.max_iterations
        )))
    }
}

/// Implied volatility with the default solver configuration
pub fn implied_volatility(
    observed_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    days: f64,
) -> YieldResult<f64> {
    ImpliedVolSolver::default().solve(observed_price, spot, strike, rate, days)
}
