//! Liquidity token minting and burning

use crate::config::BootstrapRule;
use crate::decimal::{Decimal, Numeric};
use crate::error::{PricingError, Result};
use crate::types::{LiquidityAction, LiquidityKind, LiquidityOutcome, PoolReserves};
use crate::validate;

use super::{settle, PricingEngine};

impl PricingEngine {
    /// Liquidity tokens minted for depositing `base_in`
    ///
    /// `base_in * total_supply / credited_base`. With zero outstanding supply
    /// the configured [`BootstrapRule`] decides.
    pub fn liquidity_minted(
        &self,
        base_in: impl Numeric,
        base_reserve: impl Numeric,
        total_liquidity_supply: impl Numeric,
    ) -> Option<Decimal> {
        settle(
            "liquidity_minted",
            self.try_liquidity_minted(base_in, base_reserve, total_liquidity_supply),
        )
    }

    /// Quote tokens that must accompany a `base_in` deposit, rounded up so
    /// the pool never under-collects
    pub fn required_quote_for_base_deposit(
        &self,
        base_in: impl Numeric,
        reserves: &PoolReserves,
    ) -> Option<Decimal> {
        settle(
            "required_quote_for_base_deposit",
            self.try_required_quote_for_base_deposit(base_in, reserves),
        )
    }

    /// Base that must accompany a `quote_in` deposit, rounded down
    pub fn required_base_for_quote_deposit(
        &self,
        quote_in: impl Numeric,
        reserves: &PoolReserves,
    ) -> Option<Decimal> {
        settle(
            "required_base_for_quote_deposit",
            self.try_required_base_for_quote_deposit(quote_in, reserves),
        )
    }

    /// Base returned for burning `liquidity_burned`, subsidy credited first
    pub fn withdrawal_base_out(
        &self,
        liquidity_burned: impl Numeric,
        total_liquidity_supply: impl Numeric,
        base_reserve: impl Numeric,
    ) -> Option<Decimal> {
        settle(
            "withdrawal_base_out",
            self.try_withdrawal_base_out(liquidity_burned, total_liquidity_supply, base_reserve),
        )
    }

    /// Quote tokens returned for burning `liquidity_burned`
    pub fn withdrawal_quote_out(
        &self,
        liquidity_burned: impl Numeric,
        total_liquidity_supply: impl Numeric,
        quote_reserve: impl Numeric,
    ) -> Option<Decimal> {
        settle(
            "withdrawal_quote_out",
            self.try_withdrawal_quote_out(liquidity_burned, total_liquidity_supply, quote_reserve),
        )
    }

    /// Evaluate a deposit or withdrawal against a single reserve snapshot
    pub fn apply_liquidity(
        &self,
        action: &LiquidityAction,
        reserves: &PoolReserves,
    ) -> Option<LiquidityOutcome> {
        settle("apply_liquidity", self.try_apply_liquidity(action, reserves))
    }

    fn try_apply_liquidity(
        &self,
        action: &LiquidityAction,
        reserves: &PoolReserves,
    ) -> Result<LiquidityOutcome> {
        let supply = &action.total_liquidity_supply;
        match action.kind {
            LiquidityKind::Add => Ok(LiquidityOutcome::Added {
                base_in: validate::positive("base_in", &action.amount_in)?,
                quote_required: self.try_required_quote_for_base_deposit(&action.amount_in, reserves)?,
                liquidity_minted: self.try_liquidity_minted(&action.amount_in, &reserves.base, supply)?,
            }),
            LiquidityKind::Remove => Ok(LiquidityOutcome::Removed {
                liquidity_burned: validate::positive("liquidity_burned", &action.amount_in)?,
                base_out: self.try_withdrawal_base_out(&action.amount_in, supply, &reserves.base)?,
                quote_out: self.try_withdrawal_quote_out(&action.amount_in, supply, &reserves.quote)?,
            }),
        }
    }

    fn try_liquidity_minted<A: Numeric, B: Numeric, S: Numeric>(
        &self,
        base_in: A,
        base_reserve: B,
        total_liquidity_supply: S,
    ) -> Result<Decimal> {
        let base_in = validate::positive("base_in", base_in)?;
        let base = self.credited_base(base_reserve)?;
        let supply = validate::non_negative("total_liquidity_supply", total_liquidity_supply)?;

        if supply.is_zero() && self.config().liquidity.bootstrap == BootstrapRule::OneToOne {
            return Ok(base_in);
        }
        // for a zero supply under ScaleBySupply this is zero
        validate::divide("liquidity_minted", &(&base_in * &supply), &base)
    }

    fn try_required_quote_for_base_deposit<T: Numeric>(
        &self,
        base_in: T,
        reserves: &PoolReserves,
    ) -> Result<Decimal> {
        let base_in = validate::positive("base_in", base_in)?;
        let (base, quote) = self.credited_reserves(reserves)?;
        let exact = validate::divide("required_quote_for_base_deposit", &(&base_in * &quote), &base)?;
        Ok(exact.ceil())
    }

    fn try_required_base_for_quote_deposit<T: Numeric>(
        &self,
        quote_in: T,
        reserves: &PoolReserves,
    ) -> Result<Decimal> {
        let quote_in = validate::positive("quote_in", quote_in)?;
        let (base, quote) = self.credited_reserves(reserves)?;
        let exact = validate::divide("required_base_for_quote_deposit", &(&quote_in * &base), &quote)?;
        Ok(exact.floor())
    }

    fn try_withdrawal_base_out<L: Numeric, S: Numeric, R: Numeric>(
        &self,
        liquidity_burned: L,
        total_liquidity_supply: S,
        base_reserve: R,
    ) -> Result<Decimal> {
        let (burned, supply) = burn_share(liquidity_burned, total_liquidity_supply)?;
        let base = self.credited_base(base_reserve)?;
        validate::divide("withdrawal_base_out", &(&base * &burned), &supply)
    }

    fn try_withdrawal_quote_out<L: Numeric, S: Numeric, R: Numeric>(
        &self,
        liquidity_burned: L,
        total_liquidity_supply: S,
        quote_reserve: R,
    ) -> Result<Decimal> {
        let (burned, supply) = burn_share(liquidity_burned, total_liquidity_supply)?;
        let quote = validate::positive("quote_reserve", quote_reserve)?;
        validate::divide("withdrawal_quote_out", &(&quote * &burned), &supply)
    }
}

/// Validated `(burned, supply)` pair; more liquidity than exists cannot be burned
fn burn_share<L: Numeric, S: Numeric>(liquidity_burned: L, total_liquidity_supply: S) -> Result<(Decimal, Decimal)> {
    let burned = validate::positive("liquidity_burned", liquidity_burned)?;
    let supply = validate::positive("total_liquidity_supply", total_liquidity_supply)?;
    if burned > supply {
        return Err(PricingError::insufficient_liquidity(format!(
            "burning {burned} of a {supply} liquidity supply"
        )));
    }
    Ok((burned, supply))
}
