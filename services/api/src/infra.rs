use async_trait::async_trait;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use velo_orders::orders::{
    CreditReport, CreditScore, CreditService, CreditServiceError, Order, OrderCode, OrderDraft,
    OrderRepository, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryOrderRepository {
    records: Arc<Mutex<HashMap<OrderCode, Order>>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, draft: OrderDraft) -> Result<Order, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("order store lock poisoned".to_string()))?;
        if guard.contains_key(&draft.id) {
            return Err(RepositoryError::Conflict);
        }
        let order = draft.into_order(Utc::now());
        guard.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_code(&self, code: &OrderCode) -> Result<Option<Order>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("order store lock poisoned".to_string()))?;
        Ok(guard.get(code).cloned())
    }
}

impl InMemoryOrderRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

/// Offline stand-in for the bureau used by the CLI demo.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimulatedCreditService {
    pub(crate) score: i64,
}

#[async_trait]
impl CreditService for SimulatedCreditService {
    async fn fetch_score(&self, cpf: &str) -> Result<CreditReport, CreditServiceError> {
        if cpf.trim().is_empty() {
            return Err(CreditServiceError::MissingDocument);
        }
        Ok(CreditReport {
            status: "Done".to_string(),
            score: CreditScore(self.score),
        })
    }
}
