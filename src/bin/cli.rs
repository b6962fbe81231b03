//! HodlYield CLI
//!
//! Covered-call screener: fetches (or loads) a call chain, computes yield and
//! risk metrics per contract and flags them against your thresholds.
//!
//! Usage:
//!   cargo run --bin hodl-yield -- --ticker IBIT --expiry 2025-01-17 --max-delta 0.25
//!   cargo run --bin hodl-yield -- --snapshot chain.json --spot 60.1

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hodl_yield::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "hodl-yield")]
#[command(about = "Covered-call yield and delta screener")]
struct Args {
    /// Underlying symbol (default from config, IBIT)
    #[arg(long)]
    ticker: Option<String>,

    /// Expiration date YYYY-MM-DD (default: nearest listed)
    #[arg(long)]
    expiry: Option<NaiveDate>,

    /// List available expirations and exit
    #[arg(long)]
    list_expirations: bool,

    /// Offline call chain JSON instead of fetching
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Spot price for --snapshot when the file has none
    #[arg(long)]
    spot: Option<f64>,

    /// Risk-free rate as a fraction (skips fetching ^IRX)
    #[arg(long)]
    rate: Option<f64>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Your average purchase price
    #[arg(long)]
    cost_basis: Option<f64>,

    /// Highest acceptable delta
    #[arg(long)]
    max_delta: Option<f64>,

    /// Lowest acceptable annualized yield, in percent
    #[arg(long)]
    min_yield: Option<f64>,

    /// Bypass the local cache
    #[arg(long)]
    no_cache: bool,

    /// Clear cached data for the ticker before fetching
    #[arg(long)]
    clear_cache: bool,

    /// Evaluate contracts in parallel
    #[arg(long)]
    parallel: bool,

    /// Print screened rows as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let today = Utc::now().date_naive();

    let (chain, spot, rate) = match &args.snapshot {
        Some(path) => load_snapshot(path, &args, &config)?,
        None => {
            let mut cache_config = config.cache.clone();
            if args.no_cache {
                cache_config.enabled = false;
            }
            let fetcher = CachedFetcher::new(YahooClient::new()?, cache_config)?;
            if args.clear_cache {
                fetcher.cache().clear(&config.ticker)?;
            }

            match fetch_chain(&fetcher, &args, &config)? {
                Some(fetched) => fetched,
                None => return Ok(()),
            }
        }
    };

    let ctx = PricingContext::for_expiry(spot, chain.expiry, today, rate)?;
    info!(
        "{} {}: spot {:.2}, {} DTE, rate {:.2}%, {} calls",
        chain.underlying,
        chain.expiry,
        spot,
        ctx.days_to_expiration(),
        rate * 100.0,
        chain.calls.len()
    );

    let metrics = config
        .pipeline()?
        .compute_rows(&chain.calls, &ctx)
        .with_context(|| format!("computing metrics for {} {}", chain.underlying, chain.expiry))?;
    let screened = screen(&metrics, spot, &config.screen);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&screened)?);
    } else {
        print_table(&screened);
        print_candidates(&screened);
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    if let Some(ticker) = &args.ticker {
        config.ticker = ticker.to_uppercase();
    }
    if let Some(basis) = args.cost_basis {
        config.screen.cost_basis = Some(basis);
    }
    if let Some(max_delta) = args.max_delta {
        config.screen.max_delta = max_delta;
    }
    if let Some(min_yield) = args.min_yield {
        config.screen.min_annualized_yield = min_yield / 100.0;
    }
    if args.parallel {
        config.parallel = true;
    }

    config.validate()?;
    Ok(config)
}

fn load_snapshot(path: &Path, args: &Args, config: &AppConfig) -> Result<(CallChain, f64, f64)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let chain: CallChain = serde_json::from_str(&json)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;

    let spot = args
        .spot
        .or(chain.spot)
        .ok_or_else(|| anyhow!("snapshot has no spot price; pass --spot"))?;
    let rate = args.rate.unwrap_or(config.fallback_risk_free_rate);

    Ok((chain, spot, rate))
}

fn fetch_chain<S: MarketDataSource>(
    source: &S,
    args: &Args,
    config: &AppConfig,
) -> Result<Option<(CallChain, f64, f64)>> {
    let ticker = &config.ticker;
    let spot = source
        .spot_quote(ticker)
        .with_context(|| format!("fetching price for {ticker}"))?
        .price;

    let expiries = source.expirations(ticker)?;
    if expiries.is_empty() {
        bail!("no option expirations listed for {ticker}");
    }

    if args.list_expirations {
        println!("{} expirations for {}:", expiries.len(), ticker);
        for expiry in &expiries {
            println!("  {}", expiry);
        }
        return Ok(None);
    }

    let expiry = match args.expiry {
        Some(e) if expiries.contains(&e) => e,
        Some(e) => bail!("{ticker} has no expiration on {e}; try --list-expirations"),
        None => expiries[0],
    };

    let rate = match args.rate {
        Some(rate) => rate,
        None => resolve_risk_free_rate(source, config.fallback_risk_free_rate),
    };

    let chain = source.call_chain(ticker, expiry)?;
    Ok(Some((chain, spot, rate)))
}

fn flag_label(flag: RowFlag) -> &'static str {
    match flag {
        RowFlag::BelowCostBasis => "BELOW BASIS",
        RowFlag::ExceedsMaxDelta => "RISKY",
        RowFlag::Candidate => "CANDIDATE",
        RowFlag::Neutral => "",
    }
}

fn print_table(rows: &[ScreenedContract]) {
    println!(
        "{:>8} {:>7} {:>7} {:>7} {:>8} {:>6} {:>8} {:>9} {:>8}  {:<9} {:<17} {}",
        "Strike",
        "Bid",
        "Ask",
        "Last",
        "Premium",
        "Delta",
        "OTM %",
        "Ann. Yld",
        "Static",
        "Source",
        "Vol source",
        "Flag"
    );
    println!("{}", "-".repeat(120));

    for row in rows {
        let m = &row.metrics;
        let delta_mark = if m.delta_source == DeltaSource::MoneynessFallback {
            "*"
        } else {
            " "
        };
        print!(
            "{:>8.2} {:>7.2} {:>7.2} {:>7.2} {:>8.2} {:>5.2}{} ",
            m.strike, m.bid, m.ask, m.last_price, m.premium, m.delta, delta_mark
        );
        println!(
            "{:>7.2}% {:>8.2}% {:>7.2}%  {:<9} {:<17} {}",
            m.otm_fraction * 100.0,
            m.annualized_yield * 100.0,
            m.static_return * 100.0,
            format!("{:?}", m.premium_source),
            format!("{:?}", m.volatility_source),
            flag_label(row.flag)
        );
    }

    println!("\n* delta from moneyness, no usable volatility");
}

fn print_candidates(rows: &[ScreenedContract]) {
    let ranked = rank_candidates(rows);
    if ranked.is_empty() {
        println!("\nNo contract meets all thresholds.");
        return;
    }

    println!("\nCandidates (best annualized yield first):");
    for row in ranked.iter().take(5) {
        let m = &row.metrics;
        println!(
            "  {:>8.2}  delta {:.2}  yield {:.2}%  premium ${:.2}",
            m.strike,
            m.delta,
            m.annualized_yield * 100.0,
            m.premium
        );
    }
}
