use axum::http::StatusCode;
use levelfolio::api;
use levelfolio::config::Config;
use levelfolio::datasource::mock::{mock_pair, MockMarketData};
use levelfolio::db::init_db;
use levelfolio::{Investment, Repository};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app(market: Arc<MockMarketData>) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        dexscreener_api_url: "http://example.invalid".to_string(),
        price_cache_ttl: Duration::from_secs(30),
        upstream_timeout: Duration::from_secs(1),
        upstream_max_retry: Duration::ZERO,
    };

    let state = api::AppState::new(repo.clone(), &config, market);
    TestApp {
        app: api::create_router(state),
        repo,
        _temp: temp_dir,
    }
}

async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder
            .header("authorization", "Bearer test-token")
            .header("x-user-id", user);
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn market() -> MockMarketData {
    MockMarketData::new()
        .with_symbol_pairs("BTC", vec![mock_pair("BTC", "60000", 1_000_000.0)])
        .with_symbol_pairs("USDC", vec![mock_pair("USDC", "1", 1_000_000.0)])
}

fn stored(id: &str, user: &str, ticker: &str, amount: f64, created_at: &str) -> Investment {
    Investment {
        id: id.to_string(),
        user_id: user.to_string(),
        token_ticker: ticker.to_string(),
        token_name: ticker.to_string(),
        token_amount: amount,
        created_at: created_at.to_string(),
        updated_at: created_at.to_string(),
    }
}

#[tokio::test]
async fn test_investments_require_auth_headers() {
    let test = setup_test_app(Arc::new(market())).await;
    let (status, body) = request(test.app, "GET", "/api/investments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_investment_normalizes_ticker() {
    let test = setup_test_app(Arc::new(market())).await;
    let (status, body) = request(
        test.app.clone(),
        "POST",
        "/api/investments",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "btc", "tokenAmount": 0.5 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tokenTicker"], "BTC");
    assert_eq!(body["tokenName"], "BTC Token");
    assert_eq!(body["userId"], "alice");
    assert_eq!(body["tokenAmount"], 0.5);

    let listed = tokio_test::assert_ok!(test.repo.list_investments("alice").await);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, body["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_create_investment_validation() {
    let test = setup_test_app(Arc::new(market())).await;

    let (status, _) = request(
        test.app.clone(),
        "POST",
        "/api/investments",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "BTC" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        test.app.clone(),
        "POST",
        "/api/investments",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "BTC", "tokenAmount": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        test.app,
        "POST",
        "/api/investments",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "NOPE", "tokenAmount": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("NOPE"));
}

#[tokio::test]
async fn test_create_investment_accepts_numeric_string_amount() {
    let test = setup_test_app(Arc::new(market())).await;
    let (status, body) = request(
        test.app,
        "POST",
        "/api/investments",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "BTC", "tokenAmount": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tokenAmount"], 5.0);
}

#[tokio::test]
async fn test_malformed_investment_bodies_return_json_400() {
    let test = setup_test_app(Arc::new(market())).await;

    // No body and no content type.
    let (status, body) =
        request(test.app.clone(), "POST", "/api/investments", Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = request(
        test.app.clone(),
        "POST",
        "/api/investments",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "BTC", "tokenAmount": "five" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    test.repo
        .insert_investment(&stored("inv-1", "alice", "BTC", 1.0, "2024-01-01T00:00:00.000Z"))
        .await
        .unwrap();
    let (status, body) = request(
        test.app,
        "PUT",
        "/api/investments/inv-1",
        Some("alice"),
        Some(serde_json::json!({ "tokenAmount": [1] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_investment_when_upstream_down_is_503() {
    let mock = Arc::new(market());
    mock.set_failing(true);
    let test = setup_test_app(mock).await;
    let (status, _) = request(
        test.app,
        "POST",
        "/api/investments",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "BTC", "tokenAmount": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ownership_enforced() {
    let test = setup_test_app(Arc::new(market())).await;
    test.repo
        .insert_investment(&stored("inv-1", "alice", "BTC", 1.0, "2024-01-01T00:00:00.000Z"))
        .await
        .unwrap();

    let (status, _) = request(test.app.clone(), "GET", "/api/investments/inv-1", Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        request(test.app.clone(), "DELETE", "/api/investments/inv-1", Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        request(test.app.clone(), "GET", "/api/investments/missing", Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
        request(test.app, "GET", "/api/investments/inv-1", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenTicker"], "BTC");
}

#[tokio::test]
async fn test_update_and_delete_investment() {
    let test = setup_test_app(Arc::new(market())).await;
    test.repo
        .insert_investment(&stored("inv-1", "alice", "BTC", 1.0, "2024-01-01T00:00:00.000Z"))
        .await
        .unwrap();

    let (status, body) = request(
        test.app.clone(),
        "PUT",
        "/api/investments/inv-1",
        Some("alice"),
        Some(serde_json::json!({ "tokenTicker": "usdc", "tokenAmount": 250 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenTicker"], "USDC");
    assert_eq!(body["tokenAmount"], 250.0);

    let (status, _) = request(
        test.app.clone(),
        "PUT",
        "/api/investments/inv-1",
        Some("alice"),
        Some(serde_json::json!({ "tokenAmount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        request(test.app.clone(), "DELETE", "/api/investments/inv-1", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(test.repo.get_investment("inv-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_portfolio_values_holdings_and_isolates_failures() {
    let test = setup_test_app(Arc::new(market())).await;
    test.repo
        .insert_investment(&stored("a", "alice", "USDC", 125.0, "2024-01-01T00:00:00.000Z"))
        .await
        .unwrap();
    test.repo
        .insert_investment(&stored("b", "alice", "BADTICKER", 5.0, "2024-02-01T00:00:00.000Z"))
        .await
        .unwrap();
    test.repo
        .insert_investment(&stored("c", "bob", "BTC", 10.0, "2024-03-01T00:00:00.000Z"))
        .await
        .unwrap();

    let (status, body) = request(test.app, "GET", "/api/portfolio", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalValue"], 125.0);
    assert_eq!(body["degraded"], true);
    assert_eq!(body["level"]["level"], 1);
    assert_eq!(body["level"]["progressPct"], 50.0);

    let holdings = body["holdings"].as_array().unwrap();
    assert_eq!(holdings.len(), 2);
    // Stored order, newest first.
    assert_eq!(holdings[0]["ticker"], "BADTICKER");
    assert_eq!(holdings[0]["status"], "unavailable");
    assert_eq!(holdings[0]["holdingsValue"], 0.0);
    assert_eq!(holdings[1]["ticker"], "USDC");
    assert_eq!(holdings[1]["status"], "fresh");
}

#[tokio::test]
async fn test_empty_portfolio_is_level_zero() {
    let mock = Arc::new(market());
    let test = setup_test_app(mock.clone()).await;
    let (status, body) = request(test.app, "GET", "/api/portfolio", Some("carol"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalValue"], 0.0);
    assert_eq!(body["level"]["level"], 0);
    assert_eq!(body["level"]["nextThreshold"], 100.0);
    assert_eq!(body["degraded"], false);
    assert_eq!(mock.call_count(), 0);
}
