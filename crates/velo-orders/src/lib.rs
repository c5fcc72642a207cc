//! Order decisioning, pricing, and lookup for the Velô vehicle storefront.

pub mod config;
pub mod error;
pub mod orders;
pub mod telemetry;
