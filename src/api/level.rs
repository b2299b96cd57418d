use crate::domain::LevelInfo;
use crate::engine;
use crate::error::AppError;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelQuery {
    pub total_value: f64,
}

pub async fn get_level(
    query: Result<Query<LevelQuery>, QueryRejection>,
) -> Result<Json<LevelInfo>, AppError> {
    let Query(params) = query?;
    if !params.total_value.is_finite() || params.total_value < 0.0 {
        return Err(AppError::BadRequest(
            "totalValue must be a non-negative number".into(),
        ));
    }

    Ok(Json(engine::level_info(params.total_value)))
}
