use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::credit::{CreditReport, CreditService, CreditServiceError};
use super::decision::{CreditDecision, CreditDecisionEngine};
use super::domain::{
    CarConfiguration, CheckoutRequest, Order, OrderCode, OrderDraft, OrderStatus, PaymentMethod,
};
use super::financing::{down_payment_ratio, PaymentQuote};
use super::pricing::PriceTable;
use super::repository::{OrderRepository, RepositoryError};
use super::validation::{CheckoutGuard, ValidationError};
use crate::telemetry::mask_cpf;

/// Fresh codes tried when the store reports a key collision.
const MAX_CODE_ATTEMPTS: usize = 3;

/// Service composing validation, credit decisioning, pricing, and the order store.
pub struct CheckoutService<R, C> {
    guard: CheckoutGuard,
    repository: Arc<R>,
    credit: Arc<C>,
    engine: CreditDecisionEngine,
    prices: PriceTable,
}

impl<R, C> CheckoutService<R, C>
where
    R: OrderRepository + 'static,
    C: CreditService + 'static,
{
    pub fn new(repository: Arc<R>, credit: Arc<C>) -> Self {
        Self::with_engine(repository, credit, CreditDecisionEngine::default())
    }

    pub fn with_engine(repository: Arc<R>, credit: Arc<C>, engine: CreditDecisionEngine) -> Self {
        Self {
            guard: CheckoutGuard,
            repository,
            credit,
            engine,
            prices: PriceTable::STANDARD,
        }
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Preview the price and financing schedule without side effects.
    pub fn quote(
        &self,
        configuration: &CarConfiguration,
        payment_method: PaymentMethod,
        down_payment: Decimal,
    ) -> PaymentQuote {
        PaymentQuote::build(&self.prices, configuration, payment_method, down_payment)
    }

    /// Validate, decide, price, and persist a checkout. Nothing is stored unless every
    /// earlier step succeeded.
    pub async fn submit_order(&self, request: CheckoutRequest) -> Result<Order, OrderError> {
        let vehicle_price = self.prices.total_price(&request.configuration);
        self.guard.validate(&request, vehicle_price)?;

        let status = match request.payment_method {
            PaymentMethod::Cash => OrderStatus::Approved,
            PaymentMethod::Financing => {
                let report = self.credit.fetch_score(&request.customer.cpf).await?;
                let decision = self.decide(&report, request.down_payment, vehicle_price);
                info!(
                    cpf = %mask_cpf(&request.customer.cpf),
                    score = decision.score.0,
                    rule = ?decision.rule,
                    status = decision.status.label(),
                    "credit decision reached"
                );
                decision.status
            }
        };

        let quote = self.quote(
            &request.configuration,
            request.payment_method,
            request.down_payment,
        );

        let draft = OrderDraft {
            id: OrderCode::generate(&mut rand::thread_rng()),
            configuration: self.prices.sanitize(&request.configuration),
            total_price: quote.final_price,
            customer: request.customer,
            payment_method: request.payment_method,
            installment_value: quote.installment(),
            status,
        };

        let order = self.persist(draft).await?;
        info!(
            order = %order.id,
            status = order.status.label(),
            payment = order.payment_method.label(),
            total = %order.total_price,
            "order created"
        );
        Ok(order)
    }

    /// Look an order up by a user-typed code (case and surrounding whitespace ignored).
    pub async fn find_order(&self, raw_code: &str) -> Result<Option<Order>, LookupError> {
        let code = OrderCode::normalize(raw_code);
        match self.repository.find_by_code(&code).await {
            Ok(Some(order)) => Ok(Some(order)),
            Ok(None) => {
                info!(order = %code, "order lookup miss");
                Ok(None)
            }
            Err(err) => {
                warn!(order = %code, error = %err, "order lookup failed");
                Err(LookupError::Repository(err))
            }
        }
    }

    /// Pass-through to the bureau for the standalone credit-analysis endpoint.
    pub async fn analyze_credit(&self, cpf: &str) -> Result<CreditReport, CreditServiceError> {
        self.credit.fetch_score(cpf).await
    }

    fn decide(
        &self,
        report: &CreditReport,
        down_payment: Decimal,
        vehicle_price: Decimal,
    ) -> CreditDecision {
        let ratio = down_payment_ratio(down_payment, vehicle_price);
        self.engine.evaluate(report.score, ratio)
    }

    async fn persist(&self, mut draft: OrderDraft) -> Result<Order, OrderError> {
        let mut attempt = 1;
        loop {
            match self.repository.insert(draft.clone()).await {
                Ok(order) => return Ok(order),
                Err(RepositoryError::Conflict) if attempt < MAX_CODE_ATTEMPTS => {
                    warn!(order = %draft.id, attempt, "order code collision, regenerating");
                    draft.id = OrderCode::generate(&mut rand::thread_rng());
                    attempt += 1;
                }
                Err(err) => {
                    warn!(order = %draft.id, error = %err, "order insert failed");
                    return Err(OrderError::Persistence(err));
                }
            }
        }
    }
}

/// Error raised by order submission.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    CreditService(#[from] CreditServiceError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl OrderError {
    /// Stable machine-readable error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "validation_error",
            OrderError::CreditService(_) => "credit_service_error",
            OrderError::Persistence(_) => "persistence_error",
        }
    }

    /// Text safe to show to the customer.
    pub fn user_message(&self) -> String {
        match self {
            OrderError::Validation(err) => err.to_string(),
            OrderError::CreditService(_) => {
                "credit analysis is unavailable; check your details, try again later, or pay in cash"
                    .to_string()
            }
            OrderError::Persistence(_) => {
                "could not create order right now; please try again".to_string()
            }
        }
    }
}

/// Store failure while looking an order up.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("order lookup failed: {0}")]
    Repository(#[from] RepositoryError),
}
