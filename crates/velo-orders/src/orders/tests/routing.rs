use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::orders::credit::CreditServiceError;
use crate::orders::domain::{Order, OrderStatus};
use crate::orders::router::order_router;
use crate::orders::service::CheckoutService;

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).expect("decimal field")
}

#[tokio::test]
async fn submit_then_lookup_round_trips_over_http() {
    let (service, _repository, _credit) = build_service(750);
    let app = order_router(Arc::new(service));

    let payload = serde_json::to_value(financed_request(dec!(10000))).expect("payload");
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/orders", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Order = serde_json::from_value(read_json_body(response).await).expect("order");
    assert_eq!(created.status, OrderStatus::Approved);
    assert!(created.installment_value.is_some());

    let uri = format!("/api/v1/orders/{}", created.id.as_str().to_lowercase());
    let response = app.oneshot(get(&uri)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Order = serde_json::from_value(read_json_body(response).await).expect("order");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn invalid_checkout_lists_offending_fields() {
    let (service, repository, _credit) = build_service(750);
    let app = order_router(Arc::new(service));

    let mut request = cash_request();
    request.customer.email = "marina@".to_string();
    request.accepted_terms = false;
    let payload = serde_json::to_value(request).expect("payload");

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/orders", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "validation_error");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .expect("fields array")
        .iter()
        .filter_map(|violation| violation["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["email", "terms"]);
    assert_eq!(repository.insert_calls(), 0);
}

#[tokio::test]
async fn bureau_failure_maps_to_bad_gateway() {
    let service = CheckoutService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(unreachable_credit()),
    );
    let app = order_router(Arc::new(service));

    let payload = serde_json::to_value(financed_request(dec!(0))).expect("payload");
    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/orders", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "credit_service_error");
    assert!(body["error"]
        .as_str()
        .expect("message")
        .contains("credit analysis is unavailable"));
}

#[tokio::test]
async fn store_failure_maps_to_internal_error() {
    let service = CheckoutService::new(Arc::new(UnavailableRepository), Arc::new(FixedScore::new(800)));
    let app = order_router(Arc::new(service));

    let payload = serde_json::to_value(cash_request()).expect("payload");
    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/orders", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "persistence_error");
    assert!(!body["error"]
        .as_str()
        .expect("message")
        .contains("database offline"));
}

#[tokio::test]
async fn lookup_miss_and_store_failure_are_both_not_found() {
    let (service, _repository, _credit) = build_service(800);
    let response = order_router(Arc::new(service))
        .oneshot(get("/api/v1/orders/VLO-NOPE00"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json_body(response).await["kind"], "not_found");

    let failing = CheckoutService::new(Arc::new(UnavailableRepository), Arc::new(FixedScore::new(800)));
    let response = order_router(Arc::new(failing))
        .oneshot(get("/api/v1/orders/VLO-NOPE00"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json_body(response).await["kind"], "lookup_failed");
}

#[tokio::test]
async fn quote_endpoint_prices_configuration() {
    let (service, repository, credit) = build_service(800);
    let app = order_router(Arc::new(service));

    let payload = json!({
        "configuration": {
            "wheel_type": "sport",
            "optionals": ["precision-park", "sunroof"]
        },
        "payment_method": "financiamento",
        "down_payment": "7500"
    });
    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/quotes", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(decimal(&body["vehicle_price"]), dec!(47500));
    assert_eq!(decimal(&body["financing"]["financed_amount"]), dec!(40000));
    assert_eq!(decimal(&body["financing"]["installment"]), dec!(3782.38));
    assert_eq!(decimal(&body["final_price"]), dec!(7500) + dec!(45388.56));
    assert_eq!(credit.calls(), 0);
    assert_eq!(repository.insert_calls(), 0);
}

#[tokio::test]
async fn quote_endpoint_clamps_negative_down_payment() {
    let (service, _repository, _credit) = build_service(800);
    let payload = json!({ "payment_method": "financiamento", "down_payment": "-100" });

    let response = order_router(Arc::new(service))
        .oneshot(json_request(Method::POST, "/api/v1/quotes", &payload))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(decimal(&body["down_payment"]), Decimal::ZERO);
    assert_eq!(decimal(&body["financing"]["financed_amount"]), dec!(40000));
}

#[tokio::test]
async fn credit_analysis_requires_cpf() {
    let (service, _repository, credit) = build_service(640);
    let app = order_router(Arc::new(service));

    for payload in [json!({}), json!({ "cpf": "   " })] {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/credit-analysis", &payload))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json_body(response).await["error"], "cpf is required");
    }
    assert_eq!(credit.calls(), 0);
}

#[tokio::test]
async fn credit_analysis_returns_score() {
    let (service, _repository, _credit) = build_service(640);
    let payload = json!({ "cpf": "529.982.247-25" });

    let response = order_router(Arc::new(service))
        .oneshot(json_request(Method::POST, "/api/v1/credit-analysis", &payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "status": "Done", "score": 640 }));
}

#[tokio::test]
async fn credit_analysis_maps_bureau_failures() {
    let cases = [
        (
            CreditServiceError::Transport("timeout".to_string()),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (CreditServiceError::UpstreamStatus(500), StatusCode::BAD_GATEWAY),
        (
            CreditServiceError::MalformedResponse("missing score field".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
    ];

    for (failure, expected) in cases {
        let service = CheckoutService::new(
            Arc::new(MemoryRepository::default()),
            Arc::new(FailingCredit(failure.clone())),
        );
        let payload = json!({ "cpf": "52998224725" });
        let response = order_router(Arc::new(service))
            .oneshot(json_request(Method::POST, "/api/v1/credit-analysis", &payload))
            .await
            .expect("response");
        assert_eq!(response.status(), expected, "{failure}");
    }
}
