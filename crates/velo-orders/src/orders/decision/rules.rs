use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::super::domain::{CreditScore, OrderStatus};
use super::config::DecisionThresholds;

/// Credit policy rules in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    HighDownPayment,
    HighScore,
    MidScore,
    LowScore,
}

pub(crate) const POLICY: [DecisionRule; 4] = [
    DecisionRule::HighDownPayment,
    DecisionRule::HighScore,
    DecisionRule::MidScore,
    DecisionRule::LowScore,
];

impl DecisionRule {
    pub(crate) fn matches(
        self,
        score: CreditScore,
        down_payment_ratio: Decimal,
        thresholds: &DecisionThresholds,
    ) -> bool {
        let CreditScore(score) = score;
        match self {
            DecisionRule::HighDownPayment => {
                down_payment_ratio >= thresholds.high_down_payment_ratio
                    && score < thresholds.approval_score
            }
            DecisionRule::HighScore => score > thresholds.approval_score,
            DecisionRule::MidScore => {
                (thresholds.review_floor..=thresholds.approval_score).contains(&score)
            }
            DecisionRule::LowScore => true,
        }
    }

    pub const fn status(self) -> OrderStatus {
        match self {
            DecisionRule::HighDownPayment | DecisionRule::HighScore => OrderStatus::Approved,
            DecisionRule::MidScore => OrderStatus::UnderReview,
            DecisionRule::LowScore => OrderStatus::Rejected,
        }
    }

    pub const fn summary(self) -> &'static str {
        match self {
            DecisionRule::HighDownPayment => "approved on high down payment",
            DecisionRule::HighScore => "approved on credit score",
            DecisionRule::MidScore => "routed to credit analysis",
            DecisionRule::LowScore => "rejected on credit score",
        }
    }
}
