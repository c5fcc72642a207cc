use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::credit::{CreditService, CreditServiceError};
use super::domain::{CarConfiguration, CheckoutRequest, PaymentMethod};
use super::repository::OrderRepository;
use super::service::{CheckoutService, OrderError};

/// Router builder exposing checkout, lookup, quote, and credit-analysis endpoints.
pub fn order_router<R, C>(service: Arc<CheckoutService<R, C>>) -> Router
where
    R: OrderRepository + 'static,
    C: CreditService + 'static,
{
    Router::new()
        .route("/api/v1/orders", post(submit_handler::<R, C>))
        .route("/api/v1/orders/:code", get(lookup_handler::<R, C>))
        .route("/api/v1/quotes", post(quote_handler::<R, C>))
        .route("/api/v1/credit-analysis", post(credit_analysis_handler::<R, C>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R, C>(
    State(service): State<Arc<CheckoutService<R, C>>>,
    axum::Json(request): axum::Json<CheckoutRequest>,
) -> Response
where
    R: OrderRepository + 'static,
    C: CreditService + 'static,
{
    match service.submit_order(request).await {
        Ok(order) => (StatusCode::CREATED, axum::Json(order)).into_response(),
        Err(error) => {
            let status = match &error {
                OrderError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                OrderError::CreditService(_) => StatusCode::BAD_GATEWAY,
                OrderError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let mut payload = json!({
                "error": error.user_message(),
                "kind": error.kind(),
            });
            if let OrderError::Validation(validation) = &error {
                payload["fields"] = json!(validation.violations);
            }
            (status, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn lookup_handler<R, C>(
    State(service): State<Arc<CheckoutService<R, C>>>,
    Path(code): Path<String>,
) -> Response
where
    R: OrderRepository + 'static,
    C: CreditService + 'static,
{
    match service.find_order(&code).await {
        Ok(Some(order)) => (StatusCode::OK, axum::Json(order)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": "order not found",
                "kind": "not_found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(_) => {
            let payload = json!({
                "error": "order not found",
                "kind": "lookup_failed",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteRequest {
    #[serde(default)]
    pub(crate) configuration: CarConfiguration,
    pub(crate) payment_method: PaymentMethod,
    #[serde(default)]
    pub(crate) down_payment: Decimal,
}

pub(crate) async fn quote_handler<R, C>(
    State(service): State<Arc<CheckoutService<R, C>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    R: OrderRepository + 'static,
    C: CreditService + 'static,
{
    let down_payment = request.down_payment.max(Decimal::ZERO);
    let quote = service.quote(&request.configuration, request.payment_method, down_payment);
    (StatusCode::OK, axum::Json(quote)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreditAnalysisRequest {
    #[serde(default)]
    pub(crate) cpf: Option<String>,
}

pub(crate) async fn credit_analysis_handler<R, C>(
    State(service): State<Arc<CheckoutService<R, C>>>,
    axum::Json(request): axum::Json<CreditAnalysisRequest>,
) -> Response
where
    R: OrderRepository + 'static,
    C: CreditService + 'static,
{
    let cpf = request.cpf.unwrap_or_default();
    if cpf.trim().is_empty() {
        let payload = json!({ "error": "cpf is required" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    match service.analyze_credit(&cpf).await {
        Ok(report) => {
            let payload = json!({
                "status": report.status,
                "score": report.score,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(CreditServiceError::MissingDocument) => {
            let payload = json!({ "error": "cpf is required" });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(CreditServiceError::Transport(_)) => {
            let payload = json!({ "error": "credit service communication failed" });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(CreditServiceError::UpstreamStatus(_)) => {
            let payload = json!({ "error": "credit query failed" });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(CreditServiceError::MalformedResponse(_)) => {
            let payload = json!({ "error": "invalid response from credit service" });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
