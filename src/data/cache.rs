//! Local data caching
//!
//! Caches market data as JSON files to avoid refetching on every run. Each
//! kind of data has its own time-to-live: prices go stale in a minute, the
//! risk-free rate in a day.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::yahoo::{MarketDataSource, RISK_FREE_SYMBOL};
use crate::core::{CallChain, SpotQuote, YieldError, YieldResult};

/// Time-to-live per data kind, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtl {
    pub spot_secs: i64,
    pub expirations_secs: i64,
    pub chain_secs: i64,
    pub rate_secs: i64,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            spot_secs: 60,
            expirations_secs: 3600,
            chain_secs: 300,
            rate_secs: 86400,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Whether to use cache
    pub enabled: bool,
    pub ttl: CacheTtl,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            enabled: true,
            ttl: CacheTtl::default(),
        }
    }
}

/// Data cache manager
pub struct DataCache {
    config: CacheConfig,
}

impl DataCache {
    pub fn new(config: CacheConfig) -> YieldResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cache file for a symbol and data kind
    fn cache_key(&self, symbol: &str, kind: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}_{}.json", file_stem(symbol), kind))
    }

    /// Entry exists and is younger than `max_age_secs`
    pub fn is_fresh(&self, symbol: &str, kind: &str, max_age_secs: i64) -> bool {
        if !self.config.enabled {
            return false;
        }

        let path = self.cache_key(symbol, kind);
        let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return false,
        };

        let modified: DateTime<Utc> = modified.into();
        Utc::now() - modified < Duration::seconds(max_age_secs)
    }

    pub fn store<T: Serialize>(&self, symbol: &str, kind: &str, value: &T) -> YieldResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.cache_key(symbol, kind);
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| YieldError::Serialization(e.to_string()))?;
        fs::write(&path, json)?;

        tracing::info!("Cached {} for {} at {:?}", kind, symbol, path);
        Ok(())
    }

    /// Fresh entry, or `None` when missing, stale or disabled
    pub fn load<T: DeserializeOwned>(
        &self,
        symbol: &str,
        kind: &str,
        max_age_secs: i64,
    ) -> YieldResult<Option<T>> {
        if !self.is_fresh(symbol, kind, max_age_secs) {
            return Ok(None);
        }

        let json = fs::read_to_string(self.cache_key(symbol, kind))?;
        let value = serde_json::from_str(&json)
            .map_err(|e| YieldError::Serialization(e.to_string()))?;

        tracing::info!("Loaded {} for {} from cache", kind, symbol);
        Ok(Some(value))
    }

    /// Clear cache for a symbol
    pub fn clear(&self, symbol: &str) -> YieldResult<()> {
        if !self.config.cache_dir.exists() {
            return Ok(());
        }

        let prefix = format!("{}_", file_stem(symbol));
        for entry in fs::read_dir(&self.config.cache_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with(&prefix) {
                fs::remove_file(entry.path())?;
            }
        }

        Ok(())
    }

    /// Clear all cache
    pub fn clear_all(&self) -> YieldResult<()> {
        if self.config.cache_dir.exists() {
            fs::remove_dir_all(&self.config.cache_dir)?;
            fs::create_dir_all(&self.config.cache_dir)?;
        }
        Ok(())
    }
}

/// Symbols such as `^IRX` are not safe file names
fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Cached data fetcher - serves fresh entries from disk, fetches the rest
pub struct CachedFetcher<S> {
    source: S,
    cache: DataCache,
}

impl<S: MarketDataSource> CachedFetcher<S> {
    pub fn new(source: S, config: CacheConfig) -> YieldResult<Self> {
        Ok(Self {
            source,
            cache: DataCache::new(config)?,
        })
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    fn cached<T, F>(&self, symbol: &str, kind: &str, ttl: i64, fetch: F) -> YieldResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&S) -> YieldResult<T>,
    {
        if let Some(value) = self.cache.load(symbol, kind, ttl)? {
            return Ok(value);
        }

        tracing::info!("Fetching fresh {} for {}", kind, symbol);
        let value = fetch(&self.source)?;
        self.cache.store(symbol, kind, &value)?;
        Ok(value)
    }
}

impl<S: MarketDataSource> MarketDataSource for CachedFetcher<S> {
    fn spot_quote(&self, symbol: &str) -> YieldResult<SpotQuote> {
        let ttl = self.cache.config().ttl.spot_secs;
        self.cached(symbol, "spot", ttl, |s| s.spot_quote(symbol))
    }

    fn expirations(&self, symbol: &str) -> YieldResult<Vec<NaiveDate>> {
        let ttl = self.cache.config().ttl.expirations_secs;
        self.cached(symbol, "expirations", ttl, |s| s.expirations(symbol))
    }

    fn call_chain(&self, symbol: &str, expiry: NaiveDate) -> YieldResult<CallChain> {
        let ttl = self.cache.config().ttl.chain_secs;
        let kind = format!("chain_{}", expiry.format("%Y%m%d"));
        self.cached(symbol, &kind, ttl, |s| s.call_chain(symbol, expiry))
    }

    fn risk_free_rate(&self) -> YieldResult<f64> {
        let ttl = self.cache.config().ttl.rate_secs;
        self.cached(RISK_FREE_SYMBOL, "rate", ttl, |s| s.risk_free_rate())
    }
}
