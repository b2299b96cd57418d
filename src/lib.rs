pub mod api;
pub mod cache;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use cache::TtlCache;
pub use config::Config;
pub use datasource::{
    DataSourceError, DexScreenerSource, MarketDataSource, MockMarketData, TradingPair,
};
pub use db::{init_db, Repository};
pub use domain::{
    Freshness, Holding, Investment, LevelInfo, LookupKey, PriceQuote, PriceStatus, PricedHolding,
    ResolvedQuote,
};
pub use error::AppError;
pub use orchestration::{PortfolioReport, PriceError, PriceResolver, Valuation, ValuationAggregator};
