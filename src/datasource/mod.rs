//! Market-data source abstraction for trading pair lookups.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod dexscreener;
pub mod mock;

pub use dexscreener::DexScreenerSource;
pub use mock::MockMarketData;

/// One market listing of a base token against a quote token.
///
/// Fields the upstream may omit stay optional here; normalization happens in
/// the price resolver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradingPair {
    pub base_symbol: String,
    pub base_name: String,
    pub base_address: String,
    pub price_usd: Option<String>,
    pub price_change_24h: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub pair_address: String,
    pub chain_id: String,
    pub dex_id: String,
}

/// Source of trading pairs.
///
/// Implementations are treated as unreliable: slow, rate-limited, or down.
#[async_trait]
pub trait MarketDataSource: Send + Sync + fmt::Debug {
    /// Search pairs by token symbol. May return pairs for other tokens.
    async fn search_by_symbol(&self, symbol: &str) -> Result<Vec<TradingPair>, DataSourceError>;

    /// Pairs whose base token is the given contract address.
    async fn pairs_by_address(&self, address: &str) -> Result<Vec<TradingPair>, DataSourceError>;
}

#[derive(Debug, Clone, Error)]
pub enum DataSourceError {
    /// Connection failure, timeout, DNS
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },
    /// Invalid JSON or unexpected response shape
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Rate limited")]
    RateLimited,
    /// Base URL or path segment that does not form a request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Client build error: {0}")]
    ClientBuild(String),
}
