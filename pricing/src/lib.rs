//! # CPMM Pricing
//!
//! Exact pricing for two-asset constant-product pools with a trading fee, a
//! base-side burn and an optional per-block subsidy credited to the base
//! reserve.
//!
//! ## Engines:
//! 1. **Quote**: swap outputs and exact-output inputs in both directions
//! 2. **Liquidity**: liquidity token minting, paired deposits, withdrawals
//! 3. **Impact & Rate**: effective and market rates, price impact, slippage floors
//!
//! Reserves come from the caller as a snapshot; the engine never fetches,
//! caches or mutates them. Every amount is an exact [`Decimal`] and every
//! operation answers `Some(value)` or `None`.

pub mod config;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod types;
mod validate;

pub use config::{BootstrapRule, EngineConfig, FeeConfig, LiquidityConfig};
pub use decimal::{Decimal, Numeric};
pub use engine::{minimum_acceptable_output, PricingEngine};
pub use error::{PricingError, Result};
pub use types::*;

/// Version of the pricing library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
