//! Constant-product pricing engine
//!
//! [`PricingEngine`] is a stateless bundle of pure functions parameterised by
//! an [`EngineConfig`]. Pools that differ only in subsidy, fees or token
//! decimals share one implementation; the reserve snapshot is always an
//! argument, never something the engine holds.
//!
//! Every public operation returns `Option`: `None` means "no valid result"
//! whether the arguments were rejected or the trade is impossible.

pub mod impact;
pub mod liquidity;
pub mod quote;

use std::fmt;

use tracing::{debug, trace, warn};

use crate::config::{EngineConfig, FeeConfig};
use crate::decimal::{Decimal, Numeric};
use crate::error::{PricingError, Result};
use crate::types::PoolReserves;
use crate::validate;

pub use impact::minimum_acceptable_output;

/// Pure AMM pricing functions over caller-supplied reserve snapshots
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: EngineConfig,
}

impl PricingEngine {
    /// Create an engine; an invalid fee schedule makes every operation return `None`
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create an engine after validating the configuration
    pub fn validated(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine for a pool credited with the per-block subsidy
    pub fn liquidity_baking() -> Self {
        Self::new(EngineConfig::liquidity_baking())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Both reserves with the subsidy credit applied to the base side.
    ///
    /// A raw base reserve of zero is fine as long as the credit makes it positive.
    pub(crate) fn credited_reserves(&self, reserves: &PoolReserves) -> Result<(Decimal, Decimal)> {
        let base = self.credited_base(&reserves.base)?;
        let quote = validate::positive("quote_reserve", &reserves.quote)?;
        Ok((base, quote))
    }

    pub(crate) fn credited_base<T: Numeric>(&self, base_reserve: T) -> Result<Decimal> {
        let raw = validate::non_negative("base_reserve", base_reserve)?;
        validate::ensure_positive("credited_base_reserve", self.config.subsidy.credit(&raw))
    }

    pub(crate) fn fee_terms(&self) -> Result<FeeTerms> {
        FeeTerms::from_config(&self.config.fees)
    }
}

/// Integer fee terms shared by the swap formulas.
///
/// With the default 999/1000 trading fee and 999/1000 burn:
/// `combined = 998001`, `trading_only = 999000`, `denominator = 1000000`.
#[derive(Debug, Clone)]
pub(crate) struct FeeTerms {
    /// Trading multiplier times burn multiplier, numerator
    pub combined: Decimal,

    /// Trading multiplier alone, scaled to `denominator`
    pub trading_only: Decimal,

    /// Common denominator of the two terms above
    pub denominator: Decimal,

    /// Share of base left after the burn
    pub burn: Decimal,
}

impl FeeTerms {
    pub(crate) fn from_config(fees: &FeeConfig) -> Result<Self> {
        fees.trading.validate()?;
        fees.burn.validate()?;

        let combined = fees.trading.combine(&fees.burn).ok_or_else(|| {
            PricingError::InvalidFeeSchedule(format!(
                "{} combined with {} overflows",
                fees.trading, fees.burn
            ))
        })?;
        let trading_only = Decimal::from(fees.trading.numerator) * Decimal::from(fees.burn.denominator);
        let burn = fees
            .burn
            .ratio()
            .ok_or_else(|| PricingError::InvalidFeeSchedule(fees.burn.to_string()))?;

        Ok(Self {
            combined: Decimal::from(combined.numerator),
            trading_only,
            denominator: Decimal::from(combined.denominator),
            burn,
        })
    }
}

/// Collapse an internal result into the public `Option` channel, logging why
/// a value could not be produced. Rejected arguments are routine; anything
/// else (a broken fee schedule) is logged at `warn`.
pub(crate) fn settle<T: fmt::Debug>(operation: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => {
            trace!(operation, ?value, "Computed");
            Some(value)
        }
        Err(error) if error.is_input_rejection() => {
            debug!(operation, %error, "No valid result");
            None
        }
        Err(error) => {
            warn!(operation, %error, "Engine error");
            None
        }
    }
}
