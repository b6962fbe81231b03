//! Application configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{YieldError, YieldResult, DEFAULT_RISK_FREE_RATE};
use crate::data::CacheConfig;
use crate::models::{ImpliedVolSolver, IvSolverConfig};
use crate::pricing::{ChainMetricsPipeline, ContractMetricsCalculator};
use crate::screen::ScreenConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Underlying symbol
    pub ticker: String,
    /// Rate used when the risk-free rate cannot be fetched
    pub fallback_risk_free_rate: f64,
    /// Evaluate contracts on the rayon pool
    pub parallel: bool,
    pub solver: IvSolverConfig,
    pub screen: ScreenConfig,
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ticker: "IBIT".to_string(),
            fallback_risk_free_rate: DEFAULT_RISK_FREE_RATE,
            parallel: false,
            solver: IvSolverConfig::default(),
            screen: ScreenConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> YieldResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&json)
            .map_err(|e| YieldError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> YieldResult<()> {
        self.solver.validate()?;
        if !self.fallback_risk_free_rate.is_finite() {
            return Err(YieldError::config("fallback_risk_free_rate must be finite"));
        }
        if !(0.0..=1.0).contains(&self.screen.max_delta) {
            return Err(YieldError::config(format!(
                "max_delta must be in [0, 1], got {}",
                self.screen.max_delta
            )));
        }
        Ok(())
    }

    /// Pipeline wired with this configuration's solver and parallelism
    pub fn pipeline(&self) -> YieldResult<ChainMetricsPipeline> {
        let solver = ImpliedVolSolver::new(self.solver.clone())?;
        let calculator = ContractMetricsCalculator::new(solver);
        Ok(ChainMetricsPipeline::new(calculator).parallel(self.parallel))
    }
}
