use crate::domain::{Holding, LevelInfo, PriceStatus, PricedHolding};
use crate::engine;
use crate::orchestration::resolver::PriceResolver;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

/// Total value of a set of holdings plus each holding's priced record, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub total_value: f64,
    pub holdings: Vec<PricedHolding>,
}

impl Valuation {
    pub fn empty() -> Self {
        Self {
            total_value: 0.0,
            holdings: Vec::new(),
        }
    }

    /// True if any holding was priced from stale data or could not be priced.
    pub fn is_degraded(&self) -> bool {
        self.holdings.iter().any(|h| h.status.is_degraded())
    }

    pub fn unavailable_count(&self) -> usize {
        self.holdings
            .iter()
            .filter(|h| h.status == PriceStatus::Unavailable)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    #[serde(flatten)]
    pub valuation: Valuation,
    pub level: LevelInfo,
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub struct ValuationAggregator {
    resolver: PriceResolver,
}

impl ValuationAggregator {
    pub fn new(resolver: PriceResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PriceResolver {
        &self.resolver
    }

    /// Price every holding concurrently. A failed lookup becomes a zero-valued,
    /// `Unavailable` entry instead of failing the whole valuation.
    pub async fn valuate(&self, holdings: &[Holding]) -> Valuation {
        if holdings.is_empty() {
            return Valuation::empty();
        }

        let lookups = holdings.iter().map(|holding| async move {
            match self.resolver.resolve_ticker(&holding.ticker).await {
                Ok(resolved) => PricedHolding::priced(
                    holding,
                    resolved.quote.price_usd,
                    resolved.freshness.into(),
                ),
                Err(e) => {
                    warn!("Pricing {} failed, counting it as zero: {}", holding.ticker, e);
                    PricedHolding::unavailable(holding)
                }
            }
        });

        // join_all yields results in input order.
        let priced = join_all(lookups).await;
        let total_value: f64 = priced.iter().map(|h| h.holdings_value).sum();

        Valuation {
            total_value,
            holdings: priced,
        }
    }

    /// Valuation plus the level derived from its total.
    pub async fn evaluate(&self, holdings: &[Holding]) -> PortfolioReport {
        let valuation = self.valuate(holdings).await;
        let level = engine::level_info(valuation.total_value);
        let degraded = valuation.is_degraded();

        info!(
            "Valued {} holdings at {:.2} USD (level {}, {} unavailable)",
            valuation.holdings.len(),
            valuation.total_value,
            level.level,
            valuation.unavailable_count()
        );

        PortfolioReport {
            valuation,
            level,
            degraded,
        }
    }
}
