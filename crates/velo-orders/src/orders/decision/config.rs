use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Score and down-payment cut-offs for the credit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// Down-payment share that approves scores below `approval_score`.
    pub high_down_payment_ratio: Decimal,
    /// Scores strictly above this are approved outright.
    pub approval_score: i64,
    /// Lowest score routed to manual analysis; anything below is rejected.
    pub review_floor: i64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            high_down_payment_ratio: dec!(0.5),
            approval_score: 700,
            review_floor: 501,
        }
    }
}
