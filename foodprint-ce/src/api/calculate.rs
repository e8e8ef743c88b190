//! Emissions calculation endpoints

use crate::engine::CalculationRequest;
use crate::taxonomy::normalize;
use crate::types::{normalize_country, Category};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// POST /api/emissions/calculate
///
/// **Request:** `{"dishName": "...", "ingredients": ["..."], "quantity": 1,
/// "country": "gb", "detailLevel": "standard", "month": 6}`
///
/// **Errors:** 400 on a malformed body, missing dish name, empty ingredient
/// list, quantity < 1 or month outside 1-12. Nothing else fails.
pub async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let body = state.engine.calculate_response(&request).await?;
    Ok(Json(body))
}

/// Query for the factor preview
#[derive(Debug, Deserialize)]
pub struct FactorQuery {
    pub category: String,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// GET /api/emissions/factor?category=meat&item=beef&country=gb
///
/// Runs the resolver chain for one (category, item, country) and reports
/// the value with its data quality and the tier that produced it.
pub async fn factor_preview(
    State(state): State<AppState>,
    Query(query): Query<FactorQuery>,
) -> ApiResult<Json<Value>> {
    let category = Category::parse(&query.category)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown category: {}", query.category)))?;
    let item = query.item.as_deref().map(normalize).filter(|i| !i.is_empty());
    let country = normalize_country(query.country.as_deref());

    let factor = state
        .engine
        .resolver()
        .resolve_detailed(category, item.as_deref(), &country)
        .await;

    Ok(Json(json!({
        "category": category,
        "item": item,
        "country": country,
        "value": factor.value,
        "dataQuality": factor.quality,
        "tier": factor.tier,
        "source": factor.source,
    })))
}

/// Build emissions routes
pub fn emissions_routes() -> Router<AppState> {
    Router::new()
        .route("/api/emissions/calculate", post(calculate))
        .route("/api/emissions/factor", get(factor_preview))
}
