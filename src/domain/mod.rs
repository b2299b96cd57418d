//! Domain types for portfolio valuation.
//!
//! This module provides:
//! - Price quotes and the lookup keys they are cached under
//! - Holdings, priced holdings and stored investment records
//! - Level information derived from total portfolio value

pub mod holding;
pub mod level;
pub mod quote;

pub use holding::{Holding, Investment, PriceStatus, PricedHolding};
pub use level::LevelInfo;
pub use quote::{Freshness, LookupKey, PriceQuote, ResolvedQuote};
