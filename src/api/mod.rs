pub mod auth;
pub mod health;
pub mod investments;
pub mod level;
pub mod portfolio;
pub mod prices;

use crate::config::Config;
use crate::datasource::MarketDataSource;
use crate::db::Repository;
use crate::orchestration::{PriceResolver, ValuationAggregator};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub resolver: PriceResolver,
    pub aggregator: ValuationAggregator,
}

impl AppState {
    /// Wire one price resolver (and its cache) into both the price routes and
    /// the valuation aggregator.
    pub fn new(repo: Arc<Repository>, config: &Config, source: Arc<dyn MarketDataSource>) -> Self {
        let resolver = PriceResolver::new(source, config.price_cache_ttl);
        let aggregator = ValuationAggregator::new(resolver.clone());
        Self {
            repo,
            resolver,
            aggregator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/prices/:ticker", get(prices::get_price_by_ticker))
        .route(
            "/api/prices/:chain_id/:address",
            get(prices::get_price_by_address),
        )
        .route("/api/level", get(level::get_level))
        .route(
            "/api/investments",
            get(investments::list_investments).post(investments::create_investment),
        )
        .route(
            "/api/investments/:id",
            get(investments::get_investment)
                .put(investments::update_investment)
                .delete(investments::delete_investment),
        )
        .route("/api/portfolio", get(portfolio::get_portfolio))
        .layer(cors)
        .with_state(state)
}
