//! Price resolution and portfolio valuation over the market-data source.

pub mod resolver;
pub mod valuation;

pub use resolver::{PriceError, PriceResolver, DEFAULT_PRICE_TTL};
pub use valuation::{PortfolioReport, Valuation, ValuationAggregator};
