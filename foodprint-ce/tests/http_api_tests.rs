//! HTTP API integration tests
//!
//! Drives the router with `tower::ServiceExt::oneshot`, no socket bound.

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use foodprint_ce::build_router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> (Router, sqlx::SqlitePool) {
    let state = helpers::create_test_state().await.unwrap();
    let pool = state.db.clone();
    (build_router(state), pool)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// POST /api/emissions/calculate
// ============================================================================

#[tokio::test]
async fn test_calculate_standard_response() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/emissions/calculate",
            json!({
                "dishName": "Beef Rice Bowl",
                "ingredients": ["beef", "rice"],
                "quantity": 2,
                "country": "GB",
                "month": 5
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let total = body["total"].as_f64().unwrap();
    assert!(total > 0.0);
    assert!(body["saved"].as_f64().unwrap() > 0.0);
    assert!(body["range"]["lower"].as_f64().unwrap() <= total);
    assert!(body["range"]["upper"].as_f64().unwrap() >= total);
    assert!(body["savedRange"].is_object());
    assert!(body["confidence"].is_string());
    assert!(body.get("ingredients").is_none());
}

#[tokio::test]
async fn test_calculate_basic_response() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/emissions/calculate",
            json!({
                "dishName": "Veg Soup",
                "ingredients": ["carrot", "onion", "leek"],
                "detailLevel": "basic"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 2);
    assert!(body["total"].is_number());
    assert!(body["saved"].is_number());
}

#[tokio::test]
async fn test_calculate_rejects_missing_dish_name() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/emissions/calculate",
            json!({ "ingredients": ["beef"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_calculate_rejects_empty_ingredients() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/emissions/calculate",
            json!({ "dishName": "Air", "ingredients": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calculate_rejects_zero_quantity() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/emissions/calculate",
            json!({ "dishName": "Stew", "ingredients": ["beef"], "quantity": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calculate_rejects_malformed_body() {
    let (app, _pool) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/emissions/calculate")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// GET /api/emissions/factor
// ============================================================================

#[tokio::test]
async fn test_factor_preview_falls_back_without_data() {
    let (app, _pool) = test_app().await;

    let request = Request::builder()
        .uri("/api/emissions/factor?category=meat&item=Beef&country=GB")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["category"], "meat");
    assert_eq!(body["item"], "beef");
    assert_eq!(body["country"], "gb");
    assert_eq!(body["value"], 3.0);
    assert_eq!(body["tier"], "category_average");
}

#[tokio::test]
async fn test_factor_preview_unknown_category() {
    let (app, _pool) = test_app().await;

    let request = Request::builder()
        .uri("/api/emissions/factor?category=minerals")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// POST /api/settings/provider_key
// ============================================================================

#[tokio::test]
async fn test_set_provider_key_success() {
    let (app, pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/settings/provider_key",
            json!({ "provider": "climatiq", "apiKey": "ck-test-123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("configured successfully"));
    assert_eq!(body["providers"][0], "climatiq");

    let stored = foodprint_ce::db::settings::get_provider_api_key(&pool, "climatiq")
        .await
        .unwrap();
    assert_eq!(stored, Some("ck-test-123".to_string()));
}

#[tokio::test]
async fn test_set_provider_key_rejects_whitespace_key() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/settings/provider_key",
            json!({ "provider": "climatiq", "apiKey": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_provider_key_rejects_unknown_provider() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/settings/provider_key",
            json!({ "provider": "nowhere", "apiKey": "abc" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// GET /health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _pool) = test_app().await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "foodprint-ce");
    assert!(body["providers"].as_array().unwrap().is_empty());
    assert!(body.get("last_error").is_none());
}
