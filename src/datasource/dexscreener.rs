//! DexScreener public API client.

use super::{DataSourceError, MarketDataSource, TradingPair};
use crate::config::DEFAULT_DEXSCREENER_API_URL;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Market-data source backed by `https://api.dexscreener.com/latest/dex`.
#[derive(Debug, Clone)]
pub struct DexScreenerSource {
    client: Client,
    base_url: String,
    max_retry: Duration,
}

impl DexScreenerSource {
    /// Create a client with a per-request timeout and a total retry budget.
    pub fn new(
        base_url: String,
        timeout: Duration,
        max_retry: Duration,
    ) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            max_retry,
        })
    }

    /// Create with the default DexScreener API URL.
    pub fn default_url() -> Result<Self, DataSourceError> {
        Self::new(
            DEFAULT_DEXSCREENER_API_URL.to_string(),
            Duration::from_secs(10),
            Duration::from_secs(5),
        )
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so `/`, `?` and `#` inside a segment never change the route.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DataSourceError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| DataSourceError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| DataSourceError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, DataSourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_retry),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(url.clone())
                .query(query)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl MarketDataSource for DexScreenerSource {
    async fn search_by_symbol(&self, symbol: &str) -> Result<Vec<TradingPair>, DataSourceError> {
        debug!("Searching DexScreener pairs for symbol={}", symbol);
        let url = self.endpoint(&["search"])?;
        let response = self.get_json(url, &[("q", symbol)]).await?;
        parse_pairs_response(&response)
    }

    async fn pairs_by_address(&self, address: &str) -> Result<Vec<TradingPair>, DataSourceError> {
        debug!("Fetching DexScreener pairs for address={}", address);
        let url = self.endpoint(&["tokens", address])?;
        let response = self.get_json(url, &[]).await?;
        parse_pairs_response(&response)
    }
}

/// Extract pairs from a `{"pairs": [...]}` body. A null or missing `pairs` means no results.
fn parse_pairs_response(response: &serde_json::Value) -> Result<Vec<TradingPair>, DataSourceError> {
    if !response.is_object() {
        return Err(DataSourceError::ParseError(
            "Expected object response".to_string(),
        ));
    }

    let pairs_json = match response.get("pairs") {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .ok_or_else(|| DataSourceError::ParseError("Expected pairs array".to_string()))?,
    };

    let mut pairs = Vec::with_capacity(pairs_json.len());
    for pair_json in pairs_json {
        match parse_pair(pair_json) {
            Ok(pair) => pairs.push(pair),
            Err(e) => {
                warn!("Failed to parse trading pair: {}", e);
            }
        }
    }

    Ok(pairs)
}

fn parse_pair(pair_json: &serde_json::Value) -> Result<TradingPair, DataSourceError> {
    let base_token = pair_json
        .get("baseToken")
        .ok_or_else(|| DataSourceError::ParseError("Missing baseToken field".to_string()))?;

    let base_symbol = base_token
        .get("symbol")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError("Missing baseToken.symbol field".to_string()))?
        .to_string();

    let str_field = |value: &serde_json::Value, key: &str| -> String {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    // priceUsd is documented as a string but tolerate numbers too.
    let price_usd = match pair_json.get("priceUsd") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let price_change_24h = pair_json
        .get("priceChange")
        .and_then(|v| v.get("h24"))
        .and_then(number_or_numeric_string);

    let liquidity_usd = pair_json
        .get("liquidity")
        .and_then(|v| v.get("usd"))
        .and_then(number_or_numeric_string);

    Ok(TradingPair {
        base_symbol,
        base_name: str_field(base_token, "name"),
        base_address: str_field(base_token, "address"),
        price_usd,
        price_change_24h,
        liquidity_usd,
        pair_address: str_field(pair_json, "pairAddress"),
        chain_id: str_field(pair_json, "chainId"),
        dex_id: str_field(pair_json, "dexId"),
    })
}

fn number_or_numeric_string(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_json(symbol: &str, liquidity: f64) -> serde_json::Value {
        serde_json::json!({
            "chainId": "ethereum",
            "dexId": "uniswap",
            "pairAddress": format!("0xpair{}", symbol),
            "baseToken": {
                "address": "0xbase",
                "name": format!("{} Token", symbol),
                "symbol": symbol
            },
            "priceUsd": "3012.55",
            "priceChange": { "h24": -2.4 },
            "liquidity": { "usd": liquidity }
        })
    }

    #[test]
    fn test_parse_pair_valid() {
        let pair = parse_pair(&pair_json("ETH", 500.0)).unwrap();
        assert_eq!(pair.base_symbol, "ETH");
        assert_eq!(pair.base_name, "ETH Token");
        assert_eq!(pair.base_address, "0xbase");
        assert_eq!(pair.price_usd.as_deref(), Some("3012.55"));
        assert_eq!(pair.price_change_24h, Some(-2.4));
        assert_eq!(pair.liquidity_usd, Some(500.0));
        assert_eq!(pair.pair_address, "0xpairETH");
        assert_eq!(pair.chain_id, "ethereum");
        assert_eq!(pair.dex_id, "uniswap");
    }

    #[test]
    fn test_parse_pair_optional_fields_missing() {
        let json = serde_json::json!({
            "pairAddress": "0xp",
            "baseToken": { "symbol": "PEPE" }
        });
        let pair = parse_pair(&json).unwrap();
        assert_eq!(pair.base_symbol, "PEPE");
        assert_eq!(pair.price_usd, None);
        assert_eq!(pair.price_change_24h, None);
        assert_eq!(pair.liquidity_usd, None);
        assert_eq!(pair.base_name, "");
    }

    #[test]
    fn test_parse_pair_missing_base_token() {
        let json = serde_json::json!({ "pairAddress": "0xp" });
        assert!(matches!(
            parse_pair(&json),
            Err(DataSourceError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_response_skips_malformed_pairs() {
        let response = serde_json::json!({
            "pairs": [pair_json("ETH", 10.0), { "pairAddress": "0xbroken" }, pair_json("ETH", 20.0)]
        });
        let pairs = parse_pairs_response(&response).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].liquidity_usd, Some(20.0));
    }

    #[test]
    fn test_parse_response_null_pairs_is_empty() {
        let response = serde_json::json!({ "schemaVersion": "1.0.0", "pairs": null });
        assert!(parse_pairs_response(&response).unwrap().is_empty());

        let response = serde_json::json!({ "schemaVersion": "1.0.0" });
        assert!(parse_pairs_response(&response).unwrap().is_empty());
    }

    #[test]
    fn test_parse_response_rejects_non_object() {
        let response = serde_json::json!([1, 2, 3]);
        assert!(matches!(
            parse_pairs_response(&response),
            Err(DataSourceError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_error() {
        let source = DexScreenerSource::new(
            "http://127.0.0.1:9".to_string(),
            Duration::from_millis(200),
            Duration::from_millis(0),
        )
        .unwrap();
        let result = source.search_by_symbol("BTC").await;
        assert!(result.is_err());
    }

    fn source(base_url: &str) -> DexScreenerSource {
        DexScreenerSource::new(
            base_url.to_string(),
            Duration::from_secs(1),
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let source = source("https://api.dexscreener.com/latest/dex");
        assert_eq!(
            source.endpoint(&["search"]).unwrap().as_str(),
            "https://api.dexscreener.com/latest/dex/search"
        );
        assert_eq!(
            source.endpoint(&["tokens", "0xAbC123"]).unwrap().as_str(),
            "https://api.dexscreener.com/latest/dex/tokens/0xAbC123"
        );
    }

    #[test]
    fn test_endpoint_escapes_address_segment() {
        let source = source("https://api.dexscreener.com/latest/dex");
        let url = source.endpoint(&["tokens", "../search?q=BTC"]).unwrap();
        assert_eq!(url.path_segments().unwrap().count(), 4);
        assert!(url.path().starts_with("/latest/dex/tokens/"));
        assert!(url.path().contains("%2F"));
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let source = source("not a url");
        assert!(matches!(
            source.endpoint(&["search"]),
            Err(DataSourceError::InvalidUrl(_))
        ));
    }
}
