use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBSITE: &str = "/website/site-1";

fn default_rate_limit() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

fn test_app(backend: &MockServer, status: &MockServer, rate_limit: RateLimitState) -> Router {
    app_with_urls(&backend.uri(), &status.uri(), rate_limit)
}

fn app_with_urls(backend_url: &str, status_url: &str, rate_limit: RateLimitState) -> Router {
    let backend = BackendClient::new(
        &format!("{backend_url}{WEBSITE}"),
        5,
        "craftportal-test/0.1",
    )
    .expect("backend client");
    let status =
        McStatusClient::new(status_url, 5, "craftportal-test/0.1").expect("status client");
    build_app(AppState { backend, status }, rate_limit)
}

/// Base URL of a local port nothing is listening on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

/// Money fields serialize as strings; compare them numerically.
fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected money value, got {other}"),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn mount_product(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{WEBSITE}/store/products/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_settings(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{WEBSITE}/marketplace/settings")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn discounted_product() -> Value {
    json!({
        "id": "p1",
        "name": "VIP Rank",
        "price": 100,
        "discountType": "percentage",
        "discountValue": 20
    })
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_upstream_error_maps_to_bad_gateway() {
    let response = ApiError::new("req-1", "upstream_error", "backend down").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn health_echoes_request_id() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    let app = test_app(&backend, &status, default_rate_limit());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-42");
}

// -------------------------------------------------------------------------
// Status proxy
// -------------------------------------------------------------------------

#[tokio::test]
async fn status_requires_ip() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    let app = test_app(&backend, &status, default_rate_limit());

    let response = app
        .oneshot(get("/api/status/minecraft"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "ip is required");
}

#[tokio::test]
async fn status_rejects_invalid_port() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    let app = test_app(&backend, &status, default_rate_limit());

    let response = app
        .oneshot(get("/api/status/minecraft?ip=play.example.com&port=99999"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_defaults_to_java_port() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/status/play.example.com:25565"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offline": false,
            "players": { "online": 7, "max": 20 },
            "version": { "name": "1.21.1" },
            "motd": { "clean": ["Welcome"] }
        })))
        .expect(1)
        .mount(&status)
        .await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(get("/api/status/minecraft?ip=play.example.com"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["online"], true);
    assert_eq!(json["type"], "java");
    assert_eq!(json["players"]["online"], 7);
    assert_eq!(json["version"], "1.21.1");
    assert_eq!(json["motd"], "Welcome");
}

#[tokio::test]
async fn status_upstream_failure_is_offline_with_ok_status() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&status)
        .await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(get("/api/status/minecraft?ip=down.example.com&port=19132"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["online"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn status_unreachable_upstream_is_offline_with_ok_status() {
    let backend = MockServer::start().await;
    let app = app_with_urls(&backend.uri(), &closed_port_url(), default_rate_limit());

    let response = app
        .oneshot(get("/api/status/minecraft?ip=play.example.com"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["online"], false);
    assert!(json["error"].is_string());
}

// -------------------------------------------------------------------------
// Cart quote
// -------------------------------------------------------------------------

#[tokio::test]
async fn quote_applies_product_discount() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(&backend, "p1", discounted_product()).await;
    mount_settings(&backend, json!({})).await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({ "items": [{ "product_id": "p1", "quantity": 2 }] }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let line = &json["data"]["lines"][0];
    assert_eq!(money(&line["unit"]["final_price"]), Decimal::from(80));
    assert_eq!(money(&json["data"]["subtotal"]), Decimal::from(160));
    assert_eq!(money(&json["data"]["total"]), Decimal::from(160));
    assert_eq!(json["data"]["total_label"], "160.00 ₺");
}

#[tokio::test]
async fn quote_with_cart_coupon_forwards_caller_token() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(&backend, "p1", discounted_product()).await;
    mount_settings(&backend, json!({})).await;

    Mock::given(method("GET"))
        .and(path(format!("{WEBSITE}/marketplace/coupons/SPRING10")))
        .and(header_matcher("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "SPRING10",
            "type": "cart_discount",
            "discountType": "percentage",
            "discountValue": 10,
            "isActive": true
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cart/quote")
                .header("content-type", "application/json")
                .header("authorization", "Bearer user-token")
                .body(Body::from(
                    json!({
                        "items": [{ "product_id": "p1", "quantity": 1 }],
                        "coupon_code": "SPRING10"
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(money(&json["data"]["subtotal"]), Decimal::from(80));
    assert_eq!(money(&json["data"]["cart_discount"]), Decimal::from(8));
    assert_eq!(money(&json["data"]["total"]), Decimal::from(72));
    assert_eq!(json["data"]["coupon_code"], "SPRING10");
}

#[tokio::test]
async fn quote_rejects_inactive_coupon() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(&backend, "p1", discounted_product()).await;
    mount_settings(&backend, json!({})).await;

    Mock::given(method("GET"))
        .and(path(format!("{WEBSITE}/marketplace/coupons/OLD")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "OLD",
            "type": "cart_discount",
            "discountType": "fixed",
            "discountValue": 5,
            "isActive": false
        })))
        .mount(&backend)
        .await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({
                "items": [{ "product_id": "p1", "quantity": 1 }],
                "coupon_code": "OLD"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn quote_unknown_coupon_is_validation_error() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(&backend, "p1", discounted_product()).await;
    mount_settings(&backend, json!({})).await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({
                "items": [{ "product_id": "p1", "quantity": 1 }],
                "coupon_code": "NOPE"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_skips_unknown_products() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(&backend, "p1", discounted_product()).await;
    mount_settings(&backend, json!({})).await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({
                "items": [
                    { "product_id": "p1", "quantity": 1 },
                    { "product_id": "gone", "quantity": 3 }
                ]
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let lines = json["data"]["lines"].as_array().expect("lines array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["product_id"], "p1");
}

#[tokio::test]
async fn quote_uses_bulk_discount_when_cheaper() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(
        &backend,
        "p1",
        json!({
            "id": "p1",
            "name": "VIP Rank",
            "price": "100",
            "discountType": "percentage",
            "discountValue": 5
        }),
    )
    .await;
    mount_settings(
        &backend,
        json!({ "bulkDiscount": { "type": "fixed", "amount": 10, "products": [] } }),
    )
    .await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({ "items": [{ "product_id": "p1", "quantity": 1 }] }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(money(&json["data"]["total"]), Decimal::from(90));
    assert_eq!(json["data"]["lines"][0]["unit"]["applied"], "bulk");
}

#[tokio::test]
async fn quote_rejects_zero_quantity() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    let app = test_app(&backend, &status, default_rate_limit());

    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({ "items": [{ "product_id": "p1", "quantity": 0 }] }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_too_large_to_price_is_validation_error() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(
        &backend,
        "p1",
        json!({ "id": "p1", "name": "Everything", "price": "100000000000000000000" }),
    )
    .await;
    mount_settings(&backend, json!({})).await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({ "items": [{ "product_id": "p1", "quantity": u32::MAX }] }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn quote_settings_failure_is_bad_gateway() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    mount_product(&backend, "p1", discounted_product()).await;

    Mock::given(method("GET"))
        .and(path(format!("{WEBSITE}/marketplace/settings")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend)
        .await;

    let app = test_app(&backend, &status, default_rate_limit());
    let response = app
        .oneshot(post_json(
            "/api/v1/cart/quote",
            &json!({ "items": [{ "product_id": "p1", "quantity": 1 }] }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn limited_routes_return_429_when_exhausted() {
    let backend = MockServer::start().await;
    let status = MockServer::start().await;
    let app = test_app(
        &backend,
        &status,
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let first = app
        .clone()
        .oneshot(get("/api/status/minecraft"))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = app
        .oneshot(get("/api/status/minecraft"))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(second).await;
    assert_eq!(json["error"]["code"], "rate_limited");
}
