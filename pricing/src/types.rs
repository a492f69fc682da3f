//! Core value types for the pricing engine
//!
//! All of these live for a single calculation: callers build them from a
//! reserve snapshot, hand them to the engine and drop them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decimal::{Decimal, Numeric};
use crate::error::{PricingError, Result};

/// Per-block credit added to the base reserve of a subsidised pool, in
/// smallest base units
pub const DEFAULT_SUBSIDY: u64 = 2_500_000;

/// Decimal places of the native (base) asset
pub const BASE_DECIMALS: u8 = 6;

/// The two sides of a constant-product pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    /// Native asset side, the side that receives the subsidy credit
    pub base: Decimal,

    /// Paired token side
    pub quote: Decimal,
}

impl PoolReserves {
    pub fn new(base: impl Into<Decimal>, quote: impl Into<Decimal>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Build reserves from untyped values as read from contract storage.
    ///
    /// Zero is accepted here (it is a defined failure path of the engine),
    /// negative or non-numeric values are not.
    pub fn parse(base: impl Numeric, quote: impl Numeric) -> Option<Self> {
        let base = base.to_decimal().filter(|v| !v.is_negative())?;
        let quote = quote.to_decimal().filter(|v| !v.is_negative())?;
        Some(Self { base, quote })
    }
}

/// Fixed amount unconditionally added to the base reserve before any calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidyPolicy {
    /// Whether the credit is applied at all
    pub enabled: bool,

    /// Credit in smallest base units
    pub amount: Decimal,
}

impl SubsidyPolicy {
    /// Subsidy switched on with the given amount
    pub fn enabled(amount: impl Into<Decimal>) -> Self {
        Self {
            enabled: true,
            amount: amount.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Base reserve as seen by the pool once the credit is in effect
    pub fn credit(&self, base_reserve: &Decimal) -> Decimal {
        if self.enabled {
            base_reserve + &self.amount
        } else {
            base_reserve.clone()
        }
    }
}

impl Default for SubsidyPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: Decimal::from(DEFAULT_SUBSIDY),
        }
    }
}

/// Multiplier kept as an exact integer ratio, e.g. 999/1000 for a 0.1% fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub numerator: u64,
    pub denominator: u64,
}

impl FeeSchedule {
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Apply `self` and then `other`; `None` on overflow
    pub fn combine(&self, other: &FeeSchedule) -> Option<FeeSchedule> {
        Some(FeeSchedule {
            numerator: self.numerator.checked_mul(other.numerator)?,
            denominator: self.denominator.checked_mul(other.denominator)?,
        })
    }

    /// The multiplier as an exact decimal
    pub fn ratio(&self) -> Option<Decimal> {
        Decimal::from_ratio(self.numerator, self.denominator)
    }

    /// A usable schedule keeps `0 < numerator <= denominator`
    pub fn validate(&self) -> Result<()> {
        if self.denominator == 0 {
            return Err(PricingError::InvalidFeeSchedule(format!(
                "{}/{}: denominator is zero",
                self.numerator, self.denominator
            )));
        }
        if self.numerator == 0 || self.numerator > self.denominator {
            return Err(PricingError::InvalidFeeSchedule(format!(
                "{}/{}: multiplier must lie in (0, 1]",
                self.numerator, self.denominator
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FeeSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Trade direction through the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sell the base asset, receive the quote token
    BaseToQuote,

    /// Sell the quote token, receive the base asset
    QuoteToBase,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::BaseToQuote => "base_to_quote",
            Direction::QuoteToBase => "quote_to_base",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Direction {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "base_to_quote" | "buy" | "xtz_to_token" => Ok(Direction::BaseToQuote),
            "quote_to_base" | "sell" | "token_to_xtz" => Ok(Direction::QuoteToBase),
            _ => Err(PricingError::Parse(s.to_string())),
        }
    }
}

/// Which side of the trade the caller fixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAmount {
    /// Spend exactly this much of the input asset
    ExactIn(Decimal),

    /// Receive exactly this much of the output asset
    ExactOut {
        amount: Decimal,

        /// Decimal places of the pool's quote token
        quote_decimals: u8,
    },
}

/// A swap to be priced against one reserve snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub direction: Direction,
    pub amount: TradeAmount,
}

impl TradeRequest {
    pub fn exact_in(direction: Direction, amount_in: impl Into<Decimal>) -> Self {
        Self {
            direction,
            amount: TradeAmount::ExactIn(amount_in.into()),
        }
    }

    pub fn exact_out(direction: Direction, amount_out: impl Into<Decimal>, quote_decimals: u8) -> Self {
        Self {
            direction,
            amount: TradeAmount::ExactOut {
                amount: amount_out.into(),
                quote_decimals,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityKind {
    Add,
    Remove,
}

/// Deposit or withdrawal against a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityAction {
    pub kind: LiquidityKind,

    /// Base deposited for `Add`, liquidity tokens burned for `Remove`
    pub amount_in: Decimal,

    /// Outstanding liquidity token supply before the action
    pub total_liquidity_supply: Decimal,
}

impl LiquidityAction {
    pub fn add(base_in: impl Into<Decimal>, total_liquidity_supply: impl Into<Decimal>) -> Self {
        Self {
            kind: LiquidityKind::Add,
            amount_in: base_in.into(),
            total_liquidity_supply: total_liquidity_supply.into(),
        }
    }

    pub fn remove(
        liquidity_burned: impl Into<Decimal>,
        total_liquidity_supply: impl Into<Decimal>,
    ) -> Self {
        Self {
            kind: LiquidityKind::Remove,
            amount_in: liquidity_burned.into(),
            total_liquidity_supply: total_liquidity_supply.into(),
        }
    }
}

/// Result of a [`LiquidityAction`], all amounts from the same snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiquidityOutcome {
    Added {
        base_in: Decimal,
        quote_required: Decimal,
        liquidity_minted: Decimal,
    },
    Removed {
        liquidity_burned: Decimal,
        base_out: Decimal,
        quote_out: Decimal,
    },
}

/// Tolerated shortfall of an executed trade against its quote, in [0, 1]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageGuard {
    pub allowed_slippage: Decimal,
}

impl SlippageGuard {
    /// `None` unless `0 <= allowed_slippage <= 1`
    pub fn new(allowed_slippage: impl Numeric) -> Option<Self> {
        let allowed_slippage = allowed_slippage.to_decimal()?;
        if allowed_slippage.is_negative() || allowed_slippage > Decimal::one() {
            return None;
        }
        Some(Self { allowed_slippage })
    }
}
