//! Geteilte Typen für layer-übergreifende Verträge.

pub mod options;

pub use options::{EngineOptions, PricingOptions};
pub use options::{DEFAULT_RADIUS, HEIGHT_MODIFIER, PRICE_MULTIPLIER};
