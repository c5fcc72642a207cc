use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::orders::credit::{CreditReport, CreditService, CreditServiceError};
use crate::orders::domain::{
    CarConfiguration, CheckoutRequest, CreditScore, CustomerInfo, ExteriorColor, InteriorColor,
    OptionalFeature, Order, OrderCode, OrderDraft, PaymentMethod, WheelType,
};
use crate::orders::repository::{OrderRepository, RepositoryError};
use crate::orders::service::CheckoutService;

pub(super) fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Marina".to_string(),
        surname: "Albuquerque".to_string(),
        email: "marina.albuquerque@example.com".to_string(),
        phone: "(11) 98765-4321".to_string(),
        cpf: "529.982.247-25".to_string(),
        store: "Velô Paulista - Av. Paulista, 1000".to_string(),
    }
}

pub(super) fn configuration() -> CarConfiguration {
    CarConfiguration {
        exterior_color: ExteriorColor::MidnightBlack,
        interior_color: InteriorColor::DeepBlue,
        wheel_type: WheelType::Aero,
        optionals: Default::default(),
    }
}

pub(super) fn loaded_configuration() -> CarConfiguration {
    CarConfiguration {
        wheel_type: WheelType::Sport,
        ..configuration()
    }
    .with_optionals([OptionalFeature::PrecisionPark, OptionalFeature::FluxCapacitor])
}

pub(super) fn cash_request() -> CheckoutRequest {
    CheckoutRequest {
        configuration: configuration(),
        customer: customer(),
        payment_method: PaymentMethod::Cash,
        down_payment: Decimal::ZERO,
        accepted_terms: true,
    }
}

pub(super) fn financed_request(down_payment: Decimal) -> CheckoutRequest {
    CheckoutRequest {
        payment_method: PaymentMethod::Financing,
        down_payment,
        ..cash_request()
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<HashMap<OrderCode, Order>>,
    inserts: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

#[async_trait]
impl OrderRepository for MemoryRepository {
    async fn insert(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&draft.id) {
            return Err(RepositoryError::Conflict);
        }
        let order = draft.into_order(Utc::now());
        guard.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_code(&self, code: &OrderCode) -> Result<Option<Order>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(code).cloned())
    }
}

/// Reports a key collision for the first `conflicts` inserts.
pub(super) struct CollidingRepository {
    pub(super) conflicts: AtomicUsize,
    pub(super) inner: MemoryRepository,
}

impl CollidingRepository {
    pub(super) fn new(conflicts: usize) -> Self {
        Self {
            conflicts: AtomicUsize::new(conflicts),
            inner: MemoryRepository::default(),
        }
    }
}

#[async_trait]
impl OrderRepository for CollidingRepository {
    async fn insert(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Conflict);
        }
        self.inner.insert(draft).await
    }

    async fn find_by_code(&self, code: &OrderCode) -> Result<Option<Order>, RepositoryError> {
        self.inner.find_by_code(code).await
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl OrderRepository for UnavailableRepository {
    async fn insert(&self, _draft: OrderDraft) -> Result<Order, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn find_by_code(&self, _code: &OrderCode) -> Result<Option<Order>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Bureau stub answering every request with the same score.
pub(super) struct FixedScore {
    score: i64,
    calls: AtomicUsize,
}

impl FixedScore {
    pub(super) fn new(score: i64) -> Self {
        Self {
            score,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CreditService for FixedScore {
    async fn fetch_score(&self, _cpf: &str) -> Result<CreditReport, CreditServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreditReport {
            status: "Done".to_string(),
            score: CreditScore(self.score),
        })
    }
}

/// Bureau stub that always fails with the configured error.
pub(super) struct FailingCredit(pub(super) CreditServiceError);

#[async_trait]
impl CreditService for FailingCredit {
    async fn fetch_score(&self, _cpf: &str) -> Result<CreditReport, CreditServiceError> {
        Err(self.0.clone())
    }
}

pub(super) fn unreachable_credit() -> FailingCredit {
    FailingCredit(CreditServiceError::Transport("connection refused".to_string()))
}

pub(super) fn build_service(
    score: i64,
) -> (
    CheckoutService<MemoryRepository, FixedScore>,
    Arc<MemoryRepository>,
    Arc<FixedScore>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let credit = Arc::new(FixedScore::new(score));
    let service = CheckoutService::new(repository.clone(), credit.clone());
    (service, repository, credit)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
