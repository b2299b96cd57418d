use crate::api::auth::AuthenticatedUser;
use crate::api::AppState;
use crate::domain::{Investment, LookupKey};
use crate::error::AppError;
use crate::orchestration::PriceError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvestmentRequest {
    pub token_ticker: Option<String>,
    #[serde(default, deserialize_with = "amount_from_number_or_string")]
    pub token_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvestmentRequest {
    pub token_ticker: Option<String>,
    #[serde(default, deserialize_with = "amount_from_number_or_string")]
    pub token_amount: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Amounts arrive as JSON numbers or numeric strings (`"0.5"`).
fn amount_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("tokenAmount is not a number: {:?}", s))),
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn validate_amount(amount: f64) -> Result<f64, AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest(
            "Token amount must be greater than 0".into(),
        ));
    }
    Ok(amount)
}

/// Confirm the ticker prices, returning its normalized symbol and display name.
async fn verify_ticker(state: &AppState, ticker: &str) -> Result<(String, String), AppError> {
    let key = LookupKey::ticker(ticker);
    if key.is_blank() {
        return Err(AppError::BadRequest("Token ticker is required".into()));
    }
    let symbol = key.cache_key();

    match state.resolver.resolve(&key).await {
        Ok(resolved) => Ok((symbol, resolved.quote.display_name)),
        Err(PriceError::NotFound(_)) => Err(AppError::BadRequest(format!(
            "Unable to fetch price for {}. Please check the ticker symbol.",
            symbol
        ))),
        Err(err) => Err(err.into()),
    }
}

async fn load_owned(
    state: &AppState,
    id: &str,
    user: &AuthenticatedUser,
) -> Result<Investment, AppError> {
    let investment = state
        .repo
        .get_investment(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Investment not found".into()))?;

    if investment.user_id != user.id() {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    Ok(investment)
}

pub async fn list_investments(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Investment>>, AppError> {
    let investments = state.repo.list_investments(user.id()).await?;
    Ok(Json(investments))
}

pub async fn get_investment(
    user: AuthenticatedUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Investment>, AppError> {
    Ok(Json(load_owned(&state, &id, &user).await?))
}

pub async fn create_investment(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    body: Result<Json<CreateInvestmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Investment>), AppError> {
    let Json(body) = body?;
    let (Some(ticker), Some(amount)) = (body.token_ticker.as_deref(), body.token_amount) else {
        return Err(AppError::BadRequest(
            "Token ticker and amount are required".into(),
        ));
    };
    let amount = validate_amount(amount)?;
    let (symbol, name) = verify_ticker(&state, ticker).await?;

    let now = now_timestamp();
    let investment = Investment {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id().to_string(),
        token_ticker: symbol,
        token_name: name,
        token_amount: amount,
        created_at: now.clone(),
        updated_at: now,
    };
    state.repo.insert_investment(&investment).await?;

    info!(
        "Created investment {} for user {} ({} {})",
        investment.id, investment.user_id, investment.token_amount, investment.token_ticker
    );
    Ok((StatusCode::CREATED, Json(investment)))
}

pub async fn update_investment(
    user: AuthenticatedUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Result<Json<UpdateInvestmentRequest>, JsonRejection>,
) -> Result<Json<Investment>, AppError> {
    let Json(body) = body?;
    let mut investment = load_owned(&state, &id, &user).await?;

    if let Some(amount) = body.token_amount {
        investment.token_amount = validate_amount(amount)?;
    }
    if let Some(ticker) = body.token_ticker.as_deref() {
        let (symbol, name) = verify_ticker(&state, ticker).await?;
        investment.token_ticker = symbol;
        investment.token_name = name;
    }
    investment.updated_at = now_timestamp();

    if !state.repo.update_investment(&investment).await? {
        return Err(AppError::NotFound("Investment not found".into()));
    }
    Ok(Json(investment))
}

pub async fn delete_investment(
    user: AuthenticatedUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    load_owned(&state, &id, &user).await?;
    state.repo.delete_investment(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Investment deleted successfully"
    })))
}
