//! Pricing context
//!
//! Market-wide inputs shared by every contract of one expiration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{YieldError, YieldResult};

/// Risk-free rate used when the market-data side cannot supply one (4.5%)
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.045;

/// Day-count basis for annualization and model time
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Spot, days to expiration and risk-free rate for one pipeline run.
///
/// `days_to_expiration` is always at least 1, including for expirations that
/// have already passed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingContext {
    spot: f64,
    days_to_expiration: u32,
    risk_free_rate: f64,
}

impl PricingContext {
    pub fn new(spot: f64, days_to_expiration: i64, risk_free_rate: f64) -> YieldResult<Self> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(YieldError::invalid_pricing_input(format!(
                "spot must be positive and finite, got {spot}"
            )));
        }
        if !risk_free_rate.is_finite() {
            return Err(YieldError::invalid_pricing_input(format!(
                "risk-free rate must be finite, got {risk_free_rate}"
            )));
        }

        let days = days_to_expiration.clamp(1, u32::MAX as i64) as u32;

        Ok(Self {
            spot,
            days_to_expiration: days,
            risk_free_rate,
        })
    }

    /// Context for an expiration date evaluated on `today`
    pub fn for_expiry(
        spot: f64,
        expiry: NaiveDate,
        today: NaiveDate,
        risk_free_rate: f64,
    ) -> YieldResult<Self> {
        Self::new(spot, (expiry - today).num_days(), risk_free_rate)
    }

    /// Context for a `YYYY-MM-DD` expiration string evaluated on `today`
    pub fn for_expiry_str(
        spot: f64,
        expiry: &str,
        today: NaiveDate,
        risk_free_rate: f64,
    ) -> YieldResult<Self> {
        let expiry = NaiveDate::parse_from_str(expiry, "%Y-%m-%d").map_err(|e| {
            YieldError::invalid_pricing_input(format!("bad expiration date {expiry:?}: {e}"))
        })?;
        Self::for_expiry(spot, expiry, today, risk_free_rate)
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn days_to_expiration(&self) -> u32 {
        self.days_to_expiration
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Time to expiry in years
    pub fn years_to_expiration(&self) -> f64 {
        self.days_to_expiration as f64 / DAYS_PER_YEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_clamped_to_one() {
        let ctx = PricingContext::new(60.0, 0, 0.05).unwrap();
        assert_eq!(ctx.days_to_expiration(), 1);

        let ctx = PricingContext::new(60.0, -12, 0.05).unwrap();
        assert_eq!(ctx.days_to_expiration(), 1);

        let ctx = PricingContext::new(60.0, 30, 0.05).unwrap();
        assert_eq!(ctx.days_to_expiration(), 30);
    }

    #[test]
    fn test_rejects_bad_spot_and_rate() {
        assert!(PricingContext::new(0.0, 30, 0.05).is_err());
        assert!(PricingContext::new(-1.0, 30, 0.05).is_err());
        assert!(PricingContext::new(f64::INFINITY, 30, 0.05).is_err());
        assert!(PricingContext::new(60.0, 30, f64::NAN).is_err());
    }

    #[test]
    fn test_for_expiry() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let ctx = PricingContext::for_expiry(60.0, expiry, today, 0.045).unwrap();
        assert_eq!(ctx.days_to_expiration(), 30);
        assert!((ctx.years_to_expiration() - 30.0 / 365.0).abs() < 1e-15);

        // Expired contracts still price as one day out
        let past = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
        let ctx = PricingContext::for_expiry(60.0, past, today, 0.045).unwrap();
        assert_eq!(ctx.days_to_expiration(), 1);
    }

    #[test]
    fn test_for_expiry_str() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let ctx = PricingContext::for_expiry_str(60.0, "2025-01-17", today, 0.045).unwrap();
        assert_eq!(ctx.days_to_expiration(), 15);

        let err = PricingContext::for_expiry_str(60.0, "17/01/2025", today, 0.045).unwrap_err();
        assert!(matches!(err, YieldError::InvalidPricingInput(_)));
    }
}
