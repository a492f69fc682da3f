//! Swap quotes for both directions, exact-input and exact-output
//!
//! The two directions are deliberately not mirror images. Selling base pays
//! the trading fee and the burn on the way in, so the combined multiplier
//! (998001) appears in both numerator and denominator. Selling the quote
//! token pays only the trading fee on the way in (999000 in the denominator)
//! and the burn comes off the base that leaves the pool.

use crate::decimal::{Decimal, Numeric};
use crate::error::{PricingError, Result};
use crate::types::{Direction, PoolReserves, TradeAmount, TradeRequest};
use crate::validate;

use super::{settle, PricingEngine};

impl PricingEngine {
    /// Quote tokens received for selling exactly `amount_in` base
    ///
    /// `amount_in * quote * 998001 / (credited_base * 1000000 + amount_in * 998001)`
    pub fn quote_output_for_base_input(
        &self,
        amount_in: impl Numeric,
        reserves: &PoolReserves,
    ) -> Option<Decimal> {
        settle(
            "quote_output_for_base_input",
            self.try_quote_output_for_base_input(amount_in, reserves),
        )
    }

    /// Base received for selling exactly `amount_in` quote tokens
    ///
    /// `amount_in * credited_base * 998001 / (quote * 1000000 + amount_in * 999000)`
    pub fn quote_output_for_quote_input(
        &self,
        amount_in: impl Numeric,
        reserves: &PoolReserves,
    ) -> Option<Decimal> {
        settle(
            "quote_output_for_quote_input",
            self.try_quote_output_for_quote_input(amount_in, reserves),
        )
    }

    /// Exact-input quote in either direction
    pub fn quote_output(
        &self,
        direction: Direction,
        amount_in: impl Numeric,
        reserves: &PoolReserves,
    ) -> Option<Decimal> {
        settle("quote_output", self.try_quote_output(direction, amount_in, reserves))
    }

    /// Input needed to receive exactly `amount_out` of the output asset.
    ///
    /// `quote_decimals` scales numerator and denominator alike, so with exact
    /// arithmetic it never changes the result. It is accepted for call-site
    /// compatibility with token-aware callers only. `None` when the request
    /// cannot be met by the pool net of fees.
    pub fn required_input_for_exact_output(
        &self,
        direction: Direction,
        amount_out: impl Numeric,
        reserves: &PoolReserves,
        quote_decimals: u8,
    ) -> Option<Decimal> {
        settle(
            "required_input_for_exact_output",
            self.try_required_input_for_exact_output(direction, amount_out, reserves, quote_decimals),
        )
    }

    /// Price a [`TradeRequest`]: the output for exact-input requests, the
    /// required input for exact-output requests
    pub fn quote(&self, request: &TradeRequest, reserves: &PoolReserves) -> Option<Decimal> {
        let result = match &request.amount {
            TradeAmount::ExactIn(amount_in) => {
                self.try_quote_output(request.direction, amount_in, reserves)
            }
            TradeAmount::ExactOut {
                amount,
                quote_decimals,
            } => self.try_required_input_for_exact_output(
                request.direction,
                amount,
                reserves,
                *quote_decimals,
            ),
        };
        settle("quote", result)
    }

    /// Swap one pool's quote token for another pool's quote token, routed
    /// through the base asset both pools share
    pub fn cross_pool_output(
        &self,
        amount_in: impl Numeric,
        from_pool: &PoolReserves,
        to_pool: &PoolReserves,
    ) -> Option<Decimal> {
        let result = self
            .try_quote_output_for_quote_input(amount_in, from_pool)
            .and_then(|base_out| self.try_quote_output_for_base_input(base_out, to_pool));
        settle("cross_pool_output", result)
    }

    pub(crate) fn try_quote_output<T: Numeric>(
        &self,
        direction: Direction,
        amount_in: T,
        reserves: &PoolReserves,
    ) -> Result<Decimal> {
        match direction {
            Direction::BaseToQuote => self.try_quote_output_for_base_input(amount_in, reserves),
            Direction::QuoteToBase => self.try_quote_output_for_quote_input(amount_in, reserves),
        }
    }

    pub(crate) fn try_quote_output_for_base_input<T: Numeric>(
        &self,
        amount_in: T,
        reserves: &PoolReserves,
    ) -> Result<Decimal> {
        let amount_in = validate::positive("amount_in", amount_in)?;
        let (base, quote) = self.credited_reserves(reserves)?;
        let fees = self.fee_terms()?;

        let numerator = &amount_in * &quote * &fees.combined;
        let denominator = &base * &fees.denominator + &amount_in * &fees.combined;
        validate::divide("quote_output_for_base_input", &numerator, &denominator)
    }

    pub(crate) fn try_quote_output_for_quote_input<T: Numeric>(
        &self,
        amount_in: T,
        reserves: &PoolReserves,
    ) -> Result<Decimal> {
        let amount_in = validate::positive("amount_in", amount_in)?;
        let (base, quote) = self.credited_reserves(reserves)?;
        let fees = self.fee_terms()?;

        let numerator = &amount_in * &base * &fees.combined;
        let denominator = &quote * &fees.denominator + &amount_in * &fees.trading_only;
        validate::divide("quote_output_for_quote_input", &numerator, &denominator)
    }

    pub(crate) fn try_required_input_for_exact_output<T: Numeric>(
        &self,
        direction: Direction,
        amount_out: T,
        reserves: &PoolReserves,
        quote_decimals: u8,
    ) -> Result<Decimal> {
        let amount_out = validate::positive("amount_out", amount_out)?;
        let (base, quote) = self.credited_reserves(reserves)?;
        let fees = self.fee_terms()?;
        let scale = Decimal::pow10(u32::from(quote_decimals));

        let (numerator, denominator) = match direction {
            // base_in = base * out * 1000000 / ((quote - out) * 998001)
            Direction::BaseToQuote => {
                let remaining = &quote - &amount_out;
                if !remaining.is_positive() {
                    return Err(PricingError::insufficient_liquidity(format!(
                        "requested {amount_out} of a {quote} quote reserve"
                    )));
                }
                (
                    &base * &amount_out * &fees.denominator * &scale,
                    remaining * &fees.combined * &scale,
                )
            }
            // quote_in = quote * out * 1000000 / (base * 998001 - out * 999000)
            Direction::QuoteToBase => {
                let available = &base * &fees.combined - &amount_out * &fees.trading_only;
                if !available.is_positive() {
                    return Err(PricingError::insufficient_liquidity(format!(
                        "requested {amount_out} of a {base} base reserve net of fees"
                    )));
                }
                (&quote * &amount_out * &fees.denominator * &scale, available * &scale)
            }
        };

        let required = validate::divide("required_input_for_exact_output", &numerator, &denominator)?;
        validate::ensure_positive("required_input", required)
    }
}
