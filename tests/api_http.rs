// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /analyze
// - POST /batch
// - GET /debug/catalog

use axum::{
    body::{self, Body},
    Router,
};
use http::{Request, StatusCode};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use dm_intent_triage::analyze::Analyzer;
use dm_intent_triage::api::{create_router, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

/// Same router the binary serves, over the built-in catalog without ML.
fn test_router() -> Router {
    let analyzer = Analyzer::with_builtin_catalog().expect("built-in catalog compiles");
    create_router(AppState::new(analyzer))
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = test_router().oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    assert_eq!(String::from_utf8_lossy(&bytes), "OK");
}

#[tokio::test]
async fn analyze_returns_full_record() {
    let payload = json!({
        "sender_id": "amal",
        "text": "I will come today, keep one for me, S24 Ultra price?",
        "prior_processed_count": 1
    });
    let resp = test_router()
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["sender_id"], "amal");
    assert_eq!(v["intent_tier"], "Very High");
    assert_eq!(v["intent_percent"], "100%");
    assert_eq!(v["timeframe"], "Today");
    assert_eq!(v["ready_to_buy"], true);
    assert_eq!(v["customer_segment"], "Engaged Buyer");
    assert_eq!(v["conversation_stage"], "Follow-up");
    assert_eq!(v["message_number"], 2);
    assert_eq!(v["response_plan"]["priority"], "HIGH");
    assert!(v["primary_product"]
        .as_str()
        .is_some_and(|p| p.contains("S24 Ultra")));
    assert_eq!(v["detected_products"], json!(["S24 Ultra"]));
    assert_eq!(v["topics"], json!(["Price", "Reservation & Preorder"]));
    assert_eq!(v["product_details"][0]["category"], "Samsung Galaxy");
}

#[tokio::test]
async fn analyze_defaults_optional_fields() {
    let payload = json!({ "sender_id": "x", "text": "" });
    let resp = test_router()
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["primary_product"], "Not specified");
    assert_eq!(v["topics_formatted"], "General Inquiry");
    assert_eq!(v["intent_tier"], "Low");
    assert_eq!(v["message_number"], 1);
}

#[tokio::test]
async fn analyze_rejects_malformed_body() {
    let payload = json!({ "message": "no text field" });
    let resp = test_router()
        .oneshot(post_json("/analyze", &payload))
        .await
        .expect("oneshot /analyze");
    assert!(resp.status().is_client_error(), "got {}", resp.status());
}

#[tokio::test]
async fn batch_analyzes_pending_rows_and_summarizes() {
    let rows = json!([
        { "username": "amal", "message": "hi", "processed": true },
        { "username": "amal", "message": "want to buy s24 ultra" },
        { "username": "kasun", "message": "   " },
        { "username": "nimal", "message": "price?", "post_product": "iPhone 16" }
    ]);
    let resp = test_router()
        .oneshot(post_json("/batch", &rows))
        .await
        .expect("oneshot /batch");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    let results = v["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["sender_id"], "amal");
    assert_eq!(results[0]["message_number"], 2);
    assert_eq!(results[1]["primary_product"], "iPhone 16");

    let summary = &v["summary"];
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["date"], v["date"]);
    assert!(summary["priority"].is_array());
}

#[tokio::test]
async fn batch_accepts_sheet_style_cells() {
    let rows = json!([
        { "username": "u", "message": "s24 price?", "date": "2025-01-05", "processed": false },
        { "username": "u", "message": "old", "date": "05/01/2025", "processed": "Yes" },
        { "username": "v", "message": "ps5?", "processed": "no" }
    ]);
    let resp = test_router()
        .oneshot(post_json("/batch", &rows))
        .await
        .expect("oneshot /batch");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    let results = v["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["sender_id"], "u");
    assert_eq!(results[0]["message_number"], 2);
    assert_eq!(results[0]["detected_products"], json!(["S24"]));
    assert_eq!(results[1]["sender_id"], "v");
}

#[tokio::test]
async fn debug_catalog_reports_sections_and_ml_state() {
    let req = Request::builder()
        .uri("/debug/catalog")
        .body(Body::empty())
        .expect("build GET /debug/catalog");
    let resp = test_router().oneshot(req).await.expect("oneshot /debug/catalog");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["catalog"]["topics"], 12);
    assert!(v["catalog"]["models"].as_u64().is_some_and(|n| n > 100));
    assert_eq!(v["ml"]["category_enabled"], false);
    assert_eq!(v["ml"]["polarity_provider"], "disabled");
}
