use crate::api::auth::AuthenticatedUser;
use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::PortfolioReport;
use axum::extract::State;
use axum::Json;

/// Value the caller's stored holdings at current prices and derive their level.
///
/// Never fails on pricing: holdings that cannot be priced count as zero and
/// set `degraded`.
pub async fn get_portfolio(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<PortfolioReport>, AppError> {
    let holdings = state.repo.list_holdings(user.id()).await?;
    let report = state.aggregator.evaluate(&holdings).await;
    Ok(Json(report))
}
