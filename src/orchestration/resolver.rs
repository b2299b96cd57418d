use crate::cache::TtlCache;
use crate::datasource::{DataSourceError, MarketDataSource, TradingPair};
use crate::domain::{Freshness, LookupKey, PriceQuote, ResolvedQuote};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    /// Upstream has no pair for the key and nothing is cached.
    #[error("No trading pair found for {0}")]
    NotFound(String),
    /// Upstream call failed and nothing is cached.
    #[error("Price unavailable for {key}: {detail}")]
    Unavailable { key: String, detail: String },
}

/// Why an upstream lookup produced no quote.
#[derive(Debug)]
enum FetchError {
    NoPairs,
    Source(DataSourceError),
}

impl From<DataSourceError> for FetchError {
    fn from(err: DataSourceError) -> Self {
        FetchError::Source(err)
    }
}

/// Read-through price lookup with a stale-on-failure fallback.
///
/// The cache is owned by the resolver instance; two resolvers never share
/// entries unless they were built from the same cache.
#[derive(Debug, Clone)]
pub struct PriceResolver {
    source: Arc<dyn MarketDataSource>,
    cache: Arc<TtlCache<String, PriceQuote>>,
    ttl: Duration,
}

impl PriceResolver {
    pub fn new(source: Arc<dyn MarketDataSource>, ttl: Duration) -> Self {
        Self::with_cache(source, Arc::new(TtlCache::new()), ttl)
    }

    pub fn with_cache(
        source: Arc<dyn MarketDataSource>,
        cache: Arc<TtlCache<String, PriceQuote>>,
        ttl: Duration,
    ) -> Self {
        Self { source, cache, ttl }
    }

    pub async fn resolve(&self, key: &LookupKey) -> Result<ResolvedQuote, PriceError> {
        let cache_key = key.cache_key();

        if let Some(quote) = self.cache.get(&cache_key) {
            debug!("Price for {} served from cache: {}", cache_key, quote.price_usd);
            return Ok(ResolvedQuote {
                quote,
                freshness: Freshness::Cached,
            });
        }

        match self.fetch(key).await {
            Ok(quote) => {
                debug!("Price for {} fetched: {}", cache_key, quote.price_usd);
                self.cache.put(cache_key, quote.clone(), self.ttl);
                Ok(ResolvedQuote {
                    quote,
                    freshness: Freshness::Live,
                })
            }
            Err(err) => {
                if let Some(quote) = self.cache.get_stale(&cache_key) {
                    warn!(
                        "Serving stale price for {} after upstream failure: {:?}",
                        cache_key, err
                    );
                    return Ok(ResolvedQuote {
                        quote,
                        freshness: Freshness::Stale,
                    });
                }

                Err(match err {
                    FetchError::NoPairs => PriceError::NotFound(cache_key),
                    FetchError::Source(source_err) => PriceError::Unavailable {
                        key: cache_key,
                        detail: source_err.to_string(),
                    },
                })
            }
        }
    }

    /// Convenience wrapper for ticker lookups.
    pub async fn resolve_ticker(&self, ticker: &str) -> Result<ResolvedQuote, PriceError> {
        self.resolve(&LookupKey::ticker(ticker)).await
    }

    async fn fetch(&self, key: &LookupKey) -> Result<PriceQuote, FetchError> {
        let pair = match key {
            LookupKey::Ticker(symbol) => {
                let pairs = self.source.search_by_symbol(symbol).await?;
                select_by_liquidity(symbol, pairs)
            }
            LookupKey::Address { address, .. } => {
                self.source.pairs_by_address(address).await?.into_iter().next()
            }
        };

        pair.map(normalize).ok_or(FetchError::NoPairs)
    }
}

/// Highest-liquidity pair whose base symbol matches `symbol`. Ties keep the first seen.
fn select_by_liquidity(symbol: &str, pairs: Vec<TradingPair>) -> Option<TradingPair> {
    let mut best: Option<TradingPair> = None;
    for pair in pairs {
        if !pair.base_symbol.eq_ignore_ascii_case(symbol) {
            continue;
        }
        let beats_best = match &best {
            None => true,
            Some(current) => liquidity(&pair) > liquidity(current),
        };
        if beats_best {
            best = Some(pair);
        }
    }
    best
}

fn liquidity(pair: &TradingPair) -> f64 {
    pair.liquidity_usd.filter(|l| l.is_finite()).unwrap_or(0.0)
}

fn normalize(pair: TradingPair) -> PriceQuote {
    let price_usd = pair
        .price_usd
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0);

    let liquidity_usd = liquidity(&pair);
    let display_name = if pair.base_name.is_empty() {
        pair.base_symbol.clone()
    } else {
        pair.base_name
    };

    PriceQuote {
        symbol: pair.base_symbol,
        display_name,
        price_usd,
        change_24h_pct: pair
            .price_change_24h
            .filter(|c| c.is_finite())
            .unwrap_or(0.0),
        liquidity_usd,
        source_pair_id: pair.pair_address,
        chain_id: pair.chain_id,
        dex_id: pair.dex_id,
    }
}
