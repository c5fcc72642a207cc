mod config;
mod rules;

pub use config::DecisionThresholds;
pub use rules::DecisionRule;

use rules::POLICY;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{CreditScore, OrderStatus};

/// Stateless engine walking the credit policy top to bottom; the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct CreditDecisionEngine {
    thresholds: DecisionThresholds,
}

impl CreditDecisionEngine {
    pub fn new(thresholds: DecisionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &DecisionThresholds {
        &self.thresholds
    }

    pub fn evaluate(&self, score: CreditScore, down_payment_ratio: Decimal) -> CreditDecision {
        let rule = POLICY
            .into_iter()
            .find(|rule| rule.matches(score, down_payment_ratio, &self.thresholds))
            .unwrap_or(DecisionRule::LowScore);

        CreditDecision {
            status: rule.status(),
            rule,
            score,
        }
    }
}

/// Outcome plus the rule that produced it, for audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditDecision {
    pub status: OrderStatus,
    pub rule: DecisionRule,
    pub score: CreditScore,
}

/// Decide a financed order under the standard thresholds.
pub fn decide(score: CreditScore, down_payment_ratio: Decimal) -> OrderStatus {
    CreditDecisionEngine::default()
        .evaluate(score, down_payment_ratio)
        .status
}
