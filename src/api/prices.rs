use crate::api::AppState;
use crate::domain::{Freshness, LookupKey, PriceQuote, ResolvedQuote};
use crate::error::AppError;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub data: PriceQuote,
    pub freshness: Freshness,
    pub degraded: bool,
}

impl From<ResolvedQuote> for PriceResponse {
    fn from(resolved: ResolvedQuote) -> Self {
        Self {
            degraded: resolved.freshness.is_degraded(),
            freshness: resolved.freshness,
            data: resolved.quote,
        }
    }
}

pub async fn get_price_by_ticker(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PriceResponse>, AppError> {
    let key = LookupKey::ticker(&ticker);
    if key.is_blank() {
        return Err(AppError::BadRequest("Token ticker is required".into()));
    }

    let resolved = state.resolver.resolve(&key).await?;
    Ok(Json(resolved.into()))
}

pub async fn get_price_by_address(
    Path((chain_id, address)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<PriceResponse>, AppError> {
    let key = LookupKey::address(&chain_id, &address);
    if key.is_blank() {
        return Err(AppError::BadRequest(
            "Chain ID and contract address are required".into(),
        ));
    }
    if !address.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::BadRequest(format!(
            "Invalid contract address: {}",
            address.trim()
        )));
    }

    let resolved = state.resolver.resolve(&key).await?;
    Ok(Json(resolved.into()))
}
