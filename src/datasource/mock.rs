//! Mock market-data source for testing without network calls.

use super::{DataSourceError, MarketDataSource, TradingPair};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory market data with a switchable outage and a call counter.
#[derive(Debug, Default)]
pub struct MockMarketData {
    by_symbol: HashMap<String, Vec<TradingPair>>,
    by_address: HashMap<String, Vec<TradingPair>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs returned by `search_by_symbol` for this exact query (case-insensitive).
    pub fn with_symbol_pairs(mut self, query: &str, pairs: Vec<TradingPair>) -> Self {
        self.by_symbol.insert(query.to_uppercase(), pairs);
        self
    }

    pub fn with_address_pairs(mut self, address: &str, pairs: Vec<TradingPair>) -> Self {
        self.by_address.insert(address.to_string(), pairs);
        self
    }

    /// Make every subsequent call fail with a network error (or recover).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of lookups made against this source so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataSourceError::NetworkError(
                "mock upstream unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build a pair with the fields the resolver looks at.
pub fn mock_pair(symbol: &str, price_usd: &str, liquidity_usd: f64) -> TradingPair {
    TradingPair {
        base_symbol: symbol.to_string(),
        base_name: format!("{} Token", symbol),
        base_address: format!("0x{}", symbol.to_lowercase()),
        price_usd: Some(price_usd.to_string()),
        price_change_24h: Some(1.0),
        liquidity_usd: Some(liquidity_usd),
        pair_address: format!("0xpair-{}-{}", symbol.to_lowercase(), liquidity_usd),
        chain_id: "ethereum".to_string(),
        dex_id: "uniswap".to_string(),
    }
}

#[async_trait]
impl MarketDataSource for MockMarketData {
    async fn search_by_symbol(&self, symbol: &str) -> Result<Vec<TradingPair>, DataSourceError> {
        self.begin_call()?;
        Ok(self
            .by_symbol
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn pairs_by_address(&self, address: &str) -> Result<Vec<TradingPair>, DataSourceError> {
        self.begin_call()?;
        Ok(self.by_address.get(address).cloned().unwrap_or_default())
    }
}
