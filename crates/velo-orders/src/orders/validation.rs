use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{digits_only, CheckoutRequest, CustomerInfo, PaymentMethod};
use super::financing::amortize;

const MIN_NAME_CHARS: usize = 2;
const CPF_DIGITS: usize = 11;
const CENT_SCALE: u32 = 2;
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 10..=11;

/// Checkout form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    Name,
    Surname,
    Email,
    Phone,
    Cpf,
    Store,
    Terms,
    DownPayment,
}

impl CheckoutField {
    pub const fn as_str(self) -> &'static str {
        match self {
            CheckoutField::Name => "name",
            CheckoutField::Surname => "surname",
            CheckoutField::Email => "email",
            CheckoutField::Phone => "phone",
            CheckoutField::Cpf => "cpf",
            CheckoutField::Store => "store",
            CheckoutField::Terms => "terms",
            CheckoutField::DownPayment => "down_payment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: CheckoutField,
    pub message: String,
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> Vec<CheckoutField> {
        self.violations.iter().map(|violation| violation.field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self
            .violations
            .iter()
            .map(|violation| violation.field.as_str())
            .collect();
        write!(f, "invalid checkout fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationError {}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Rejects checkout requests before any side effect happens.
#[derive(Debug, Clone, Default)]
pub struct CheckoutGuard;

impl CheckoutGuard {
    pub fn validate(
        &self,
        request: &CheckoutRequest,
        vehicle_price: Decimal,
    ) -> Result<(), ValidationError> {
        let mut violations = customer_violations(&request.customer);

        if !request.accepted_terms {
            violations.push(FieldViolation {
                field: CheckoutField::Terms,
                message: "terms must be accepted".to_string(),
            });
        }

        if request.payment_method == PaymentMethod::Financing {
            if let Some(message) = down_payment_violation(request.down_payment, vehicle_price) {
                violations.push(FieldViolation {
                    field: CheckoutField::DownPayment,
                    message,
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// A financed down payment must be whole cents within `[0, vehicle_price]`, and any balance
/// left to finance must yield a non-zero installment.
fn down_payment_violation(down_payment: Decimal, vehicle_price: Decimal) -> Option<String> {
    if down_payment < Decimal::ZERO || down_payment > vehicle_price {
        return Some(format!("down payment must be between 0 and {vehicle_price}"));
    }
    if down_payment.normalize().scale() > CENT_SCALE {
        return Some("down payment must be a whole number of cents".to_string());
    }

    let schedule = amortize(vehicle_price, down_payment);
    if schedule.financed_amount > Decimal::ZERO && schedule.installment.is_zero() {
        return Some(
            "financed balance is too small for installments; pay the remainder up front"
                .to_string(),
        );
    }
    None
}

fn customer_violations(customer: &CustomerInfo) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    let mut reject = |field, message: &str| {
        violations.push(FieldViolation {
            field,
            message: message.to_string(),
        })
    };

    if customer.name.trim().chars().count() < MIN_NAME_CHARS {
        reject(CheckoutField::Name, "name must have at least 2 characters");
    }
    if customer.surname.trim().chars().count() < MIN_NAME_CHARS {
        reject(
            CheckoutField::Surname,
            "surname must have at least 2 characters",
        );
    }
    if !email_pattern().is_match(customer.email.trim()) {
        reject(CheckoutField::Email, "email is invalid");
    }
    if !PHONE_DIGITS.contains(&digits_only(&customer.phone).len()) {
        reject(CheckoutField::Phone, "phone is invalid");
    }
    if customer.cpf_digits().len() != CPF_DIGITS {
        reject(CheckoutField::Cpf, "cpf is invalid");
    }
    if customer.store.trim().is_empty() {
        reject(CheckoutField::Store, "a store must be selected");
    }

    violations
}
