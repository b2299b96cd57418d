//! Holdings supplied by the caller and their priced counterparts.

use super::quote::Freshness;
use serde::{Deserialize, Serialize};

/// A token position: ticker plus a positive amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub ticker: String,
    pub amount: f64,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, amount: f64) -> Self {
        Self {
            ticker: ticker.into(),
            amount,
        }
    }
}

/// Outcome of pricing a single holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStatus {
    Fresh,
    /// Priced from an expired cache entry because the upstream was unreachable.
    Stale,
    /// No price at all; value counted as zero.
    Unavailable,
}

impl PriceStatus {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, PriceStatus::Fresh)
    }
}

impl From<Freshness> for PriceStatus {
    fn from(freshness: Freshness) -> Self {
        match freshness {
            Freshness::Cached | Freshness::Live => PriceStatus::Fresh,
            Freshness::Stale => PriceStatus::Stale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedHolding {
    pub ticker: String,
    pub amount: f64,
    pub unit_price: f64,
    pub holdings_value: f64,
    pub status: PriceStatus,
}

impl PricedHolding {
    pub fn priced(holding: &Holding, unit_price: f64, status: PriceStatus) -> Self {
        Self {
            ticker: holding.ticker.clone(),
            amount: holding.amount,
            unit_price,
            holdings_value: holding.amount * unit_price,
            status,
        }
    }

    pub fn unavailable(holding: &Holding) -> Self {
        Self {
            ticker: holding.ticker.clone(),
            amount: holding.amount,
            unit_price: 0.0,
            holdings_value: 0.0,
            status: PriceStatus::Unavailable,
        }
    }
}

/// A stored holding record owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub user_id: String,
    pub token_ticker: String,
    pub token_name: String,
    pub token_amount: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Investment {
    pub fn holding(&self) -> Holding {
        Holding::new(self.token_ticker.clone(), self.token_amount)
    }
}
