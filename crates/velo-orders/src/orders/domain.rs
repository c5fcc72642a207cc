use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Paint options offered by the configurator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExteriorColor {
    #[default]
    GlacierBlue,
    MidnightBlack,
    LunarWhite,
}

impl ExteriorColor {
    pub const fn code(self) -> &'static str {
        match self {
            ExteriorColor::GlacierBlue => "glacier-blue",
            ExteriorColor::MidnightBlack => "midnight-black",
            ExteriorColor::LunarWhite => "lunar-white",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExteriorColor::GlacierBlue => "Glacier Blue",
            ExteriorColor::MidnightBlack => "Midnight Black",
            ExteriorColor::LunarWhite => "Lunar White",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum InteriorColor {
    #[default]
    CarbonBlack,
    DeepBlue,
}

impl InteriorColor {
    pub const fn code(self) -> &'static str {
        match self {
            InteriorColor::CarbonBlack => "carbon-black",
            InteriorColor::DeepBlue => "deep-blue",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WheelType {
    #[default]
    Aero,
    Sport,
}

impl WheelType {
    pub const fn code(self) -> &'static str {
        match self {
            WheelType::Aero => "aero",
            WheelType::Sport => "sport",
        }
    }
}

/// Add-on features priced independently of paint and wheels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionalFeature {
    PrecisionPark,
    FluxCapacitor,
}

impl OptionalFeature {
    pub const ALL: [OptionalFeature; 2] =
        [OptionalFeature::PrecisionPark, OptionalFeature::FluxCapacitor];

    pub const fn code(self) -> &'static str {
        match self {
            OptionalFeature::PrecisionPark => "precision-park",
            OptionalFeature::FluxCapacitor => "flux-capacitor",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            OptionalFeature::PrecisionPark => "Precision Park",
            OptionalFeature::FluxCapacitor => "Flux Capacitor",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.code() == code)
    }
}

/// Error returned when a textual code names no known option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

fn parse_code<T: Copy>(
    kind: &'static str,
    raw: &str,
    candidates: &[T],
    code: fn(T) -> &'static str,
) -> Result<T, UnknownCode> {
    let needle = raw.trim().to_ascii_lowercase();
    candidates
        .iter()
        .copied()
        .find(|candidate| code(*candidate) == needle)
        .ok_or_else(|| UnknownCode {
            kind,
            value: raw.to_string(),
        })
}

impl FromStr for ExteriorColor {
    type Err = UnknownCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_code(
            "exterior color",
            raw,
            &[Self::GlacierBlue, Self::MidnightBlack, Self::LunarWhite],
            Self::code,
        )
    }
}

impl FromStr for InteriorColor {
    type Err = UnknownCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_code(
            "interior color",
            raw,
            &[Self::CarbonBlack, Self::DeepBlue],
            Self::code,
        )
    }
}

impl FromStr for WheelType {
    type Err = UnknownCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_code("wheel type", raw, &[Self::Aero, Self::Sport], Self::code)
    }
}

impl FromStr for OptionalFeature {
    type Err = UnknownCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_code("optional", raw, &Self::ALL, Self::code)
    }
}

/// A customer's car build. Unknown optional codes are dropped while deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfiguration {
    pub exterior_color: ExteriorColor,
    pub interior_color: InteriorColor,
    pub wheel_type: WheelType,
    #[serde(deserialize_with = "deserialize_optionals")]
    pub optionals: BTreeSet<OptionalFeature>,
}

impl CarConfiguration {
    pub fn with_optionals(mut self, optionals: impl IntoIterator<Item = OptionalFeature>) -> Self {
        self.optionals.extend(optionals);
        self
    }
}

/// Accept any JSON shape for `optionals`, keeping only recognized string codes.
pub(crate) fn deserialize_optionals<'de, D>(
    deserializer: D,
) -> Result<BTreeSet<OptionalFeature>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(recognized_optionals(&raw))
}

pub(crate) fn recognized_optionals(raw: &serde_json::Value) -> BTreeSet<OptionalFeature> {
    raw.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(serde_json::Value::as_str)
                .filter_map(OptionalFeature::from_code)
                .collect()
        })
        .unwrap_or_default()
}

/// Contact and identification details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub store: String,
}

impl CustomerInfo {
    /// CPF with any punctuation mask removed.
    pub fn cpf_digits(&self) -> String {
        digits_only(&self.cpf)
    }
}

pub(crate) fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "avista")]
    Cash,
    #[serde(rename = "financiamento")]
    Financing,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "À Vista",
            PaymentMethod::Financing => "Financiamento 12x",
        }
    }
}

/// Final decision attached to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "APROVADO")]
    Approved,
    #[serde(rename = "REPROVADO")]
    Rejected,
    #[serde(rename = "EM_ANALISE")]
    UnderReview,
}

impl OrderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OrderStatus::Approved => "APROVADO",
            OrderStatus::Rejected => "REPROVADO",
            OrderStatus::UnderReview => "EM_ANALISE",
        }
    }
}

const ORDER_CODE_PREFIX: &str = "VLO-";
const ORDER_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_CODE_SUFFIX_LEN: usize = 6;

/// Public order identifier, `VLO-` followed by six uppercase alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderCode(String);

impl OrderCode {
    pub fn generate<G: Rng + ?Sized>(rng: &mut G) -> Self {
        let suffix: String = (0..ORDER_CODE_SUFFIX_LEN)
            .map(|_| char::from(ORDER_CODE_CHARSET[rng.gen_range(0..ORDER_CODE_CHARSET.len())]))
            .collect();
        Self(format!("{ORDER_CODE_PREFIX}{suffix}"))
    }

    /// Trim and uppercase user input so lookups ignore case and surrounding whitespace.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix(ORDER_CODE_PREFIX)
            .map(|suffix| {
                suffix.len() == ORDER_CODE_SUFFIX_LEN
                    && suffix
                        .bytes()
                        .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit())
            })
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer creditworthiness reported by the bureau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditScore(pub i64);

/// Checkout form as submitted by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub configuration: CarConfiguration,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub down_payment: Decimal,
    #[serde(default)]
    pub accepted_terms: bool,
}

/// Order contents handed to the store; `created_at` is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub id: OrderCode,
    pub configuration: CarConfiguration,
    pub total_price: Decimal,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub installment_value: Option<Decimal>,
    pub status: OrderStatus,
}

impl OrderDraft {
    pub fn into_order(self, created_at: DateTime<Utc>) -> Order {
        Order {
            id: self.id,
            configuration: self.configuration,
            total_price: self.total_price,
            customer: self.customer,
            payment_method: self.payment_method,
            installment_value: self.installment_value,
            status: self.status,
            created_at,
        }
    }
}

/// A persisted order. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderCode,
    pub configuration: CarConfiguration,
    pub total_price: Decimal,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_value: Option<Decimal>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
