//! Whole-chain evaluation
//!
//! One output per input, in input order. Contracts are independent, so the
//! chain can optionally be spread across the rayon pool.

use rayon::prelude::*;

use crate::core::{ChainRow, ContractMetrics, OptionQuote, PricingContext, YieldError, YieldResult};

use super::contract::ContractMetricsCalculator;

#[derive(Debug, Clone, Default)]
pub struct ChainMetricsPipeline {
    calculator: ContractMetricsCalculator,
    parallel: bool,
}

impl ChainMetricsPipeline {
    pub fn new(calculator: ContractMetricsCalculator) -> Self {
        Self {
            calculator,
            parallel: false,
        }
    }

    /// Evaluate contracts on the rayon thread pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Metrics for every quote, order preserved.
    ///
    /// An empty chain is `MalformedChainData` rather than an empty result.
    pub fn compute_chain(
        &self,
        quotes: &[OptionQuote],
        ctx: &PricingContext,
    ) -> YieldResult<Vec<ContractMetrics>> {
        if quotes.is_empty() {
            return Err(YieldError::malformed_chain("chain contains no quotes"));
        }

        let metrics: Vec<ContractMetrics> = if self.parallel {
            quotes
                .par_iter()
                .map(|q| self.calculator.compute(q, ctx))
                .collect()
        } else {
            quotes
                .iter()
                .map(|q| self.calculator.compute(q, ctx))
                .collect()
        };

        tracing::debug!(
            contracts = metrics.len(),
            days = ctx.days_to_expiration(),
            "computed chain metrics"
        );
        Ok(metrics)
    }

    /// Validate raw vendor rows, then compute.
    ///
    /// Contracts are never dropped, so any row without a usable strike rejects
    /// the whole chain, even when the other rows are fine. Skipping bad rows
    /// instead would break the one-output-per-input contract that callers
    /// zip against.
    pub fn compute_rows(
        &self,
        rows: &[ChainRow],
        ctx: &PricingContext,
    ) -> YieldResult<Vec<ContractMetrics>> {
        if rows.is_empty() {
            return Err(YieldError::malformed_chain("chain contains no rows"));
        }

        let mut quotes = Vec::with_capacity(rows.len());
        let mut bad_rows = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            match OptionQuote::try_from(row) {
                Ok(q) => quotes.push(q),
                Err(_) => bad_rows.push(i),
            }
        }

        if !bad_rows.is_empty() {
            return Err(YieldError::malformed_chain(format!(
                "{} of {} rows lack a usable strike (first at row {})",
                bad_rows.len(),
                rows.len(),
                bad_rows[0]
            )));
        }

        self.compute_chain(&quotes, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quotes() -> Vec<OptionQuote> {
        [55.0, 60.0, 65.0, 70.0, 50.0]
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                OptionQuote::new(k)
                    .unwrap()
                    .with_bid_ask(0.2 * i as f64, 0.3 * i as f64 + 0.1)
                    .with_implied_vol(0.5)
            })
            .collect()
    }

    #[test]
    fn test_order_preserved() {
        let ctx = PricingContext::new(60.0, 30, 0.045).unwrap();
        let quotes = sample_quotes();
        let metrics = ChainMetricsPipeline::default()
            .compute_chain(&quotes, &ctx)
            .unwrap();

        assert_eq!(metrics.len(), quotes.len());
        for (q, m) in quotes.iter().zip(&metrics) {
            assert_eq!(q.strike, m.strike);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ctx = PricingContext::new(60.0, 30, 0.045).unwrap();
        let quotes = sample_quotes();
        let seq = ChainMetricsPipeline::default()
            .compute_chain(&quotes, &ctx)
            .unwrap();
        let par = ChainMetricsPipeline::default()
            .parallel(true)
            .compute_chain(&quotes, &ctx)
            .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_chain_is_malformed() {
        let ctx = PricingContext::new(60.0, 30, 0.045).unwrap();
        let err = ChainMetricsPipeline::default()
            .compute_chain(&[], &ctx)
            .unwrap_err();
        assert!(matches!(err, YieldError::MalformedChainData(_)));

        let err = ChainMetricsPipeline::default()
            .compute_rows(&[], &ctx)
            .unwrap_err();
        assert!(matches!(err, YieldError::MalformedChainData(_)));
    }

    #[test]
    fn test_rows_without_strike_rejected() {
        let ctx = PricingContext::new(60.0, 30, 0.045).unwrap();
        let rows = vec![
            ChainRow {
                strike: Some(60.0),
                bid: Some(1.0),
                ask: Some(1.2),
                ..Default::default()
            },
            ChainRow {
                bid: Some(0.5),
                ..Default::default()
            },
        ];
        let err = ChainMetricsPipeline::default()
            .compute_rows(&rows, &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("1 of 2 rows"));
    }

    #[test]
    fn test_rows_with_sparse_prices_accepted() {
        let ctx = PricingContext::new(60.0, 30, 0.045).unwrap();
        let rows = vec![
            ChainRow {
                strike: Some(62.0),
                ..Default::default()
            },
            ChainRow {
                strike: Some(64.0),
                last_price: Some(0.4),
                ..Default::default()
            },
        ];
        let metrics = ChainMetricsPipeline::default()
            .compute_rows(&rows, &ctx)
            .unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].premium, 0.0);
        assert_eq!(metrics[1].premium, 0.4);
    }
}
