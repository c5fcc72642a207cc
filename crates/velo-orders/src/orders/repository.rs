use async_trait::async_trait;

use super::domain::{Order, OrderCode, OrderDraft};

/// Order store keyed on the public order code.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order; the store stamps `created_at`.
    async fn insert(&self, draft: OrderDraft) -> Result<Order, RepositoryError>;
    async fn find_by_code(&self, code: &OrderCode) -> Result<Option<Order>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("order code already exists")]
    Conflict,
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}
