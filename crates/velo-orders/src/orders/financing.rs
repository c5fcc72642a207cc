use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use super::domain::{CarConfiguration, PaymentMethod};
use super::pricing::{PriceLine, PriceTable};

pub const INSTALLMENT_COUNT: u32 = 12;
pub const MONTHLY_RATE: Decimal = dec!(0.02);

/// Level-payment schedule for a financed balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Amortization {
    pub financed_amount: Decimal,
    pub installment: Decimal,
    pub total_financed: Decimal,
    pub interest: Decimal,
}

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `r(1+r)^n / ((1+r)^n - 1)` for the fixed rate and term.
fn annuity_factor() -> Decimal {
    let growth = (0..INSTALLMENT_COUNT).fold(Decimal::ONE, |acc, _| {
        acc * (Decimal::ONE + MONTHLY_RATE)
    });
    MONTHLY_RATE * growth / (growth - Decimal::ONE)
}

/// Price a 12x, 2% a.m. financing of `total - down_payment`.
///
/// Callers keep `down_payment` within `[0, total]`; anything above `total` finances nothing.
pub fn amortize(total: Decimal, down_payment: Decimal) -> Amortization {
    let financed_amount = (total - down_payment).max(Decimal::ZERO);
    if financed_amount.is_zero() {
        return Amortization {
            financed_amount,
            installment: Decimal::ZERO,
            total_financed: Decimal::ZERO,
            interest: Decimal::ZERO,
        };
    }

    let installment = round_currency(financed_amount * annuity_factor());
    let total_financed = installment * Decimal::from(INSTALLMENT_COUNT);

    Amortization {
        financed_amount,
        installment,
        total_financed,
        interest: total_financed - financed_amount,
    }
}

/// Share of the price paid up front; zero when the price is zero.
pub fn down_payment_ratio(down_payment: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        down_payment / total
    }
}

/// Everything the checkout page shows before the customer submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentQuote {
    pub payment_method: PaymentMethod,
    pub lines: Vec<PriceLine>,
    pub vehicle_price: Decimal,
    pub down_payment: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financing: Option<Amortization>,
    pub final_price: Decimal,
}

impl PaymentQuote {
    pub fn build(
        prices: &PriceTable,
        configuration: &CarConfiguration,
        payment_method: PaymentMethod,
        down_payment: Decimal,
    ) -> Self {
        let vehicle_price = prices.total_price(configuration);
        let lines = prices.breakdown(configuration);

        match payment_method {
            PaymentMethod::Cash => Self {
                payment_method,
                lines,
                vehicle_price,
                down_payment: Decimal::ZERO,
                financing: None,
                final_price: vehicle_price,
            },
            PaymentMethod::Financing => {
                let financing = amortize(vehicle_price, down_payment);
                Self {
                    payment_method,
                    lines,
                    vehicle_price,
                    down_payment,
                    final_price: down_payment + financing.total_financed,
                    financing: Some(financing),
                }
            }
        }
    }

    pub fn installment(&self) -> Option<Decimal> {
        self.financing.map(|schedule| schedule.installment)
    }
}
