//! Price quotes and the keys they are looked up by.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized USD price for a single token, taken from its authoritative trading pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub symbol: String,
    pub display_name: String,
    pub price_usd: f64,
    pub change_24h_pct: f64,
    pub liquidity_usd: f64,
    pub source_pair_id: String,
    pub chain_id: String,
    pub dex_id: String,
}

/// What a price is resolved by: a bare ticker or a contract address on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Ticker(String),
    Address { chain_id: String, address: String },
}

impl LookupKey {
    /// Ticker keys are trimmed and upper-cased so "eth" and "ETH " share a cache slot.
    pub fn ticker(symbol: &str) -> Self {
        LookupKey::Ticker(symbol.trim().to_uppercase())
    }

    pub fn address(chain_id: &str, address: &str) -> Self {
        LookupKey::Address {
            chain_id: chain_id.trim().to_string(),
            address: address.trim().to_string(),
        }
    }

    /// Cache key: the ticker itself, or `chainId:address`.
    pub fn cache_key(&self) -> String {
        match self {
            LookupKey::Ticker(symbol) => symbol.clone(),
            LookupKey::Address { chain_id, address } => format!("{}:{}", chain_id, address),
        }
    }

    /// Returns true if the key has nothing to look up.
    pub fn is_blank(&self) -> bool {
        match self {
            LookupKey::Ticker(symbol) => symbol.is_empty(),
            LookupKey::Address { chain_id, address } => chain_id.is_empty() || address.is_empty(),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// How current a resolved quote is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Served from the cache within its freshness window.
    Cached,
    /// Fetched from the market-data source during this call.
    Live,
    /// Past its freshness window; returned because the upstream call failed.
    Stale,
}

impl Freshness {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Freshness::Stale)
    }
}

/// A quote together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuote {
    pub quote: PriceQuote,
    pub freshness: Freshness,
}
