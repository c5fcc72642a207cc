//! Checkout pipeline for vehicle orders: pricing, financing, credit decisioning, persistence,
//! and lookup.

pub mod credit;
pub(crate) mod decision;
pub mod domain;
pub mod financing;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use credit::{CreditReport, CreditService, CreditServiceError, HttpCreditService};
pub use decision::{
    decide, CreditDecision, CreditDecisionEngine, DecisionRule, DecisionThresholds,
};
pub use domain::{
    CarConfiguration, CheckoutRequest, CreditScore, CustomerInfo, ExteriorColor, InteriorColor,
    OptionalFeature, Order, OrderCode, OrderDraft, OrderStatus, PaymentMethod, UnknownCode,
    WheelType,
};
pub use financing::{amortize, down_payment_ratio, Amortization, PaymentQuote};
pub use pricing::{format_brl, total_price, PriceLine, PriceTable};
pub use repository::{OrderRepository, RepositoryError};
pub use router::order_router;
pub use service::{CheckoutService, LookupError, OrderError};
pub use session::{ConfiguratorSnapshot, SnapshotError};
pub use validation::{CheckoutField, CheckoutGuard, FieldViolation, ValidationError};
