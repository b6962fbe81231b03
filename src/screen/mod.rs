//! Covered-call screening
//!
//! Presentation-side filtering and flagging of computed metrics against
//! user thresholds. Nothing here feeds back into the metrics themselves.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::ContractMetrics;

/// User thresholds for screening
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Highest acceptable delta (assignment risk)
    /// Default: 0.30
    pub max_delta: f64,

    /// Lowest acceptable annualized yield, as a fraction
    /// Default: 0.05
    pub min_annualized_yield: f64,

    /// Average purchase price of the held shares, if known
    pub cost_basis: Option<f64>,

    /// Strikes at or below spot * ratio are hidden
    /// Default: 0.8
    pub min_strike_ratio: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.30,
            min_annualized_yield: 0.05,
            cost_basis: None,
            min_strike_ratio: 0.8,
        }
    }
}

impl ScreenConfig {
    /// Low assignment risk, thin premiums
    pub fn conservative() -> Self {
        Self {
            max_delta: 0.15,
            min_annualized_yield: 0.02,
            ..Default::default()
        }
    }

    /// Fat premiums, frequent assignment
    pub fn aggressive() -> Self {
        Self {
            max_delta: 0.45,
            min_annualized_yield: 0.15,
            ..Default::default()
        }
    }

    fn effective_cost_basis(&self) -> Option<f64> {
        self.cost_basis.filter(|c| *c > 0.0)
    }
}

/// Screening verdict for one contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowFlag {
    /// Assignment would sell below cost basis
    BelowCostBasis,
    /// Delta above the risk limit
    ExceedsMaxDelta,
    /// Meets every threshold
    Candidate,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenedContract {
    pub metrics: ContractMetrics,
    pub flag: RowFlag,
}

/// Flag a contract; the first matching rule wins.
pub fn classify(metrics: &ContractMetrics, config: &ScreenConfig) -> RowFlag {
    let cost_basis = config.effective_cost_basis();

    if let Some(basis) = cost_basis {
        if metrics.strike < basis {
            return RowFlag::BelowCostBasis;
        }
    }

    if metrics.delta > config.max_delta {
        return RowFlag::ExceedsMaxDelta;
    }

    let above_basis = cost_basis.map_or(true, |basis| metrics.strike >= basis);
    if metrics.annualized_yield >= config.min_annualized_yield && above_basis {
        RowFlag::Candidate
    } else {
        RowFlag::Neutral
    }
}

/// Contracts whose strike is above `spot * min_strike_ratio`
pub fn strike_window(
    metrics: &[ContractMetrics],
    spot: f64,
    min_strike_ratio: f64,
) -> Vec<ContractMetrics> {
    let floor = spot * min_strike_ratio;
    metrics.iter().filter(|m| m.strike > floor).cloned().collect()
}

/// Contracts worth plotting: a real premium and a delta within [0, 1]
pub fn plottable(metrics: &[ContractMetrics]) -> Vec<&ContractMetrics> {
    metrics
        .iter()
        .filter(|m| m.delta <= 1.0 && m.premium > 0.0)
        .collect()
}

/// Strike window plus flags, order preserved
pub fn screen(
    metrics: &[ContractMetrics],
    spot: f64,
    config: &ScreenConfig,
) -> Vec<ScreenedContract> {
    strike_window(metrics, spot, config.min_strike_ratio)
        .into_iter()
        .map(|m| {
            let flag = classify(&m, config);
            ScreenedContract { metrics: m, flag }
        })
        .collect()
}

/// Candidates only, best annualized yield first
pub fn rank_candidates(screened: &[ScreenedContract]) -> Vec<&ScreenedContract> {
    let mut candidates: Vec<&ScreenedContract> = screened
        .iter()
        .filter(|s| s.flag == RowFlag::Candidate)
        .collect();
    candidates.sort_by(|a, b| {
        b.metrics
            .annualized_yield
            .partial_cmp(&a.metrics.annualized_yield)
            .unwrap_or(Ordering::Equal)
    });
    candidates
}
