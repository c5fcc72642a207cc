use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use super::domain::{CarConfiguration, OptionalFeature, WheelType};

/// Fixed catalogue prices in BRL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTable {
    pub base: Decimal,
    pub sport_wheels: Decimal,
    pub precision_park: Decimal,
    pub flux_capacitor: Decimal,
}

impl PriceTable {
    pub const STANDARD: PriceTable = PriceTable {
        base: dec!(40000.00),
        sport_wheels: dec!(2000.00),
        precision_park: dec!(5500.00),
        flux_capacitor: dec!(5000.00),
    };

    pub fn wheel_surcharge(&self, wheel_type: WheelType) -> Decimal {
        match wheel_type {
            WheelType::Aero => Decimal::ZERO,
            WheelType::Sport => self.sport_wheels,
        }
    }

    /// `None` marks an optional the table does not price.
    pub fn optional_surcharge(&self, feature: OptionalFeature) -> Option<Decimal> {
        match feature {
            OptionalFeature::PrecisionPark => Some(self.precision_park),
            OptionalFeature::FluxCapacitor => Some(self.flux_capacitor),
        }
    }

    pub fn total_price(&self, configuration: &CarConfiguration) -> Decimal {
        let optionals: Decimal = configuration
            .optionals
            .iter()
            .filter_map(|feature| self.optional_surcharge(*feature))
            .sum();

        self.base + self.wheel_surcharge(configuration.wheel_type) + optionals
    }

    /// Copy of `configuration` without optionals the table cannot price.
    pub fn sanitize(&self, configuration: &CarConfiguration) -> CarConfiguration {
        let mut sanitized = configuration.clone();
        sanitized
            .optionals
            .retain(|feature| self.optional_surcharge(*feature).is_some());
        sanitized
    }

    /// Itemized lines for quote displays.
    pub fn breakdown(&self, configuration: &CarConfiguration) -> Vec<PriceLine> {
        let mut lines = vec![PriceLine {
            item: "Base".to_string(),
            amount: self.base,
        }];

        if configuration.wheel_type == WheelType::Sport {
            lines.push(PriceLine {
                item: "Sport Wheels".to_string(),
                amount: self.sport_wheels,
            });
        }

        lines.extend(configuration.optionals.iter().filter_map(|feature| {
            self.optional_surcharge(*feature).map(|amount| PriceLine {
                item: feature.label().to_string(),
                amount,
            })
        }));

        lines
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceLine {
    pub item: String,
    pub amount: Decimal,
}

/// Total price of a configuration under the standard table.
pub fn total_price(configuration: &CarConfiguration) -> Decimal {
    PriceTable::STANDARD.total_price(configuration)
}

/// Format an amount as Brazilian Real, e.g. `R$ 42.500,00`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    let text = format!("{rounded:.2}");
    let (integer, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}R$ {grouped},{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::domain::{ExteriorColor, InteriorColor};

    fn configuration(wheel_type: WheelType, optionals: &[OptionalFeature]) -> CarConfiguration {
        CarConfiguration {
            exterior_color: ExteriorColor::MidnightBlack,
            interior_color: InteriorColor::CarbonBlack,
            wheel_type,
            optionals: optionals.iter().copied().collect(),
        }
    }

    #[test]
    fn base_configuration_costs_base_price() {
        assert_eq!(total_price(&configuration(WheelType::Aero, &[])), dec!(40000.00));
    }

    #[test]
    fn fully_loaded_configuration_sums_every_surcharge() {
        let config = configuration(
            WheelType::Sport,
            &[OptionalFeature::PrecisionPark, OptionalFeature::FluxCapacitor],
        );
        assert_eq!(total_price(&config), dec!(52500.00));
    }

    #[test]
    fn every_combination_matches_the_price_formula() {
        for wheel_type in [WheelType::Aero, WheelType::Sport] {
            for park in [false, true] {
                for flux in [false, true] {
                    let mut optionals = Vec::new();
                    if park {
                        optionals.push(OptionalFeature::PrecisionPark);
                    }
                    if flux {
                        optionals.push(OptionalFeature::FluxCapacitor);
                    }
                    let config = configuration(wheel_type, &optionals);

                    let mut expected = dec!(40000);
                    if wheel_type == WheelType::Sport {
                        expected += dec!(2000);
                    }
                    if park {
                        expected += dec!(5500);
                    }
                    if flux {
                        expected += dec!(5000);
                    }

                    let total = total_price(&config);
                    assert_eq!(total, expected);
                    assert!(total >= PriceTable::STANDARD.base);
                }
            }
        }
    }

    #[test]
    fn breakdown_lists_only_selected_items() {
        let config = configuration(WheelType::Sport, &[OptionalFeature::FluxCapacitor]);
        let lines = PriceTable::STANDARD.breakdown(&config);
        let items: Vec<&str> = lines.iter().map(|line| line.item.as_str()).collect();
        assert_eq!(items, vec!["Base", "Sport Wheels", "Flux Capacitor"]);
        let sum: Decimal = lines.iter().map(|line| line.amount).sum();
        assert_eq!(sum, total_price(&config));
    }

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(dec!(40000)), "R$ 40.000,00");
        assert_eq!(format_brl(dec!(3782.38)), "R$ 3.782,38");
        assert_eq!(format_brl(dec!(1234567.891)), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(-12.5)), "-R$ 12,50");
    }
}
