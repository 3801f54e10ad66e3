//! HTTP transport tests via tower's oneshot.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use orders_core::ChartConfig;
use orders_mcp::{create_router, ChartDelegate, Dispatcher, McpServer};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> (SqlitePool, Router) {
    let pool = orders_store::connect_in_memory().await.unwrap();
    let chart = ChartDelegate::new(ChartConfig::default(), "http://localhost:8000");
    let server = Arc::new(McpServer::new(Dispatcher::new(pool.clone(), chart)));
    let app = create_router(server, "charts");
    (pool, app)
}

async fn seed_minimal(pool: &SqlitePool) {
    sqlx::query("INSERT INTO regions (region_id, name, city) VALUES ('R1', 'East', 'Hangzhou')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO customers (customer_id, name, region_id) VALUES ('C1', 'Alibaba', 'R1')")
        .execute(pool)
        .await
        .unwrap();
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_service_info() {
    let (_pool, app) = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["service"], json!("orders-mcp"));
}

#[tokio::test]
async fn root_reports_tool_count() {
    let (_pool, app) = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["tools"], json!(9));
}

#[tokio::test]
async fn jsonrpc_tools_list_over_http() {
    let (_pool, app) = test_app().await;
    let response = app
        .oneshot(post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 9);
    assert!(tools.iter().any(|t| t["name"] == json!("order_summary")));
    assert!(tools[0]["inputSchema"].is_object());
}

#[tokio::test]
async fn jsonrpc_works_on_the_root_path() {
    let (_pool, app) = test_app().await;
    let response = app
        .oneshot(post_json(
            "/",
            json!({"jsonrpc": "2.0", "id": 7, "method": "initialize"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["id"], json!(7));
    assert_eq!(body["result"]["serverInfo"]["name"], json!("orders-mcp"));
}

#[tokio::test]
async fn jsonrpc_notification_returns_accepted() {
    let (_pool, app) = test_app().await;
    let response = app
        .oneshot(post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn rest_call_wraps_result_in_success_envelope() {
    let (pool, app) = test_app().await;
    seed_minimal(&pool).await;

    let response = app
        .oneshot(post_json("/api/tools/list_customers", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let rows: Value =
        serde_json::from_str(body["result"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(rows[0]["name"], json!("Alibaba"));
}

#[tokio::test]
async fn rest_call_surfaces_validation_failures() {
    let (_pool, app) = test_app().await;
    let response = app
        .oneshot(post_json(
            "/api/tools/update_order_status",
            json!({"order_id": "OR1", "new_status": "bogus"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("invalid order status"));
}

#[tokio::test]
async fn rest_call_unknown_tool_is_404() {
    let (_pool, app) = test_app().await;
    let response = app
        .oneshot(post_json("/api/tools/no_such_tool", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["success"], json!(false));
}

#[tokio::test]
async fn openapi_documents_are_served() {
    let (_pool, app) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert_eq!(doc["openapi"], json!("3.1.0"));
    assert!(doc["paths"]["/api/tools/list_orders"].is_object());

    let response = app
        .oneshot(Request::builder().uri("/openapi.yaml").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("openapi: 3.1.0"));
}
