//! Exchange rates, price impact and slippage guards derived from the quote
//! primitives

use crate::decimal::{Decimal, Numeric};
use crate::error::{PricingError, Result};
use crate::types::{Direction, PoolReserves, SlippageGuard};
use crate::validate;

use super::{settle, PricingEngine};

/// Scale applied to the desired output before deducting slippage
const OUTPUT_SCALE: u32 = 1_000;

/// Scale applied to the slippage fraction (1 = 100000)
const SLIPPAGE_SCALE: u32 = 100_000;

impl PricingEngine {
    /// Output per unit of input for a trade of `amount_in`, fees and subsidy
    /// included, in smallest units
    pub fn effective_exchange_rate(
        &self,
        direction: Direction,
        amount_in: impl Numeric,
        reserves: &PoolReserves,
    ) -> Option<Decimal> {
        settle(
            "effective_exchange_rate",
            self.try_effective_exchange_rate(direction, amount_in, reserves),
        )
    }

    /// [`effective_exchange_rate`](Self::effective_exchange_rate) converted
    /// to whole tokens on both sides
    pub fn display_exchange_rate(
        &self,
        direction: Direction,
        amount_in: impl Numeric,
        reserves: &PoolReserves,
        base_decimals: u8,
        quote_decimals: u8,
    ) -> Option<Decimal> {
        let result = self
            .try_effective_exchange_rate(direction, amount_in, reserves)
            .map(|rate| {
                let (input_decimals, output_decimals) = match direction {
                    Direction::BaseToQuote => (base_decimals, quote_decimals),
                    Direction::QuoteToBase => (quote_decimals, base_decimals),
                };
                rescale(&rate, input_decimals, output_decimals)
            });
        settle("display_exchange_rate", result)
    }

    /// Ideal rate with no fee, no subsidy and no trade size, in whole tokens
    pub fn market_rate(
        &self,
        direction: Direction,
        reserves: &PoolReserves,
        base_decimals: u8,
        quote_decimals: u8,
    ) -> Option<Decimal> {
        settle(
            "market_rate",
            try_market_rate(direction, reserves, base_decimals, quote_decimals),
        )
    }

    /// Relative shortfall of the real output against the mid-price output.
    ///
    /// Only the burn is charged on the real side, so the figure isolates the
    /// cost of moving the pool. A trade that buys nothing has an impact of 0.
    pub fn price_impact(
        &self,
        direction: Direction,
        amount_in: impl Numeric,
        reserves: &PoolReserves,
    ) -> Option<Decimal> {
        settle(
            "price_impact",
            self.try_price_impact(direction, amount_in, reserves),
        )
    }

    fn try_effective_exchange_rate<T: Numeric>(
        &self,
        direction: Direction,
        amount_in: T,
        reserves: &PoolReserves,
    ) -> Result<Decimal> {
        let amount_in = validate::positive("amount_in", amount_in)?;
        let output = self.try_quote_output(direction, &amount_in, reserves)?;
        validate::divide("effective_exchange_rate", &output, &amount_in)
    }

    fn try_price_impact<T: Numeric>(
        &self,
        direction: Direction,
        amount_in: T,
        reserves: &PoolReserves,
    ) -> Result<Decimal> {
        let amount_in = validate::positive("amount_in", amount_in)?;
        let (base, quote) = self.credited_reserves(reserves)?;
        let burn = self.fee_terms()?.burn;

        let (mid_price, bought) = match direction {
            Direction::BaseToQuote => {
                let in_net_burn = &amount_in * &burn;
                let bought = validate::divide(
                    "price_impact",
                    &(&in_net_burn * &quote),
                    &(&in_net_burn + &base),
                )?;
                (validate::divide("price_impact", &quote, &base)?, bought)
            }
            Direction::QuoteToBase => {
                let gross = validate::divide(
                    "price_impact",
                    &(&amount_in * &base),
                    &(&amount_in + &quote),
                )?;
                (validate::divide("price_impact", &base, &quote)?, gross * &burn)
            }
        };

        if !bought.is_positive() {
            return Ok(Decimal::zero());
        }

        let exact_quote = mid_price * &amount_in;
        validate::divide("price_impact", &(&exact_quote - &bought), &exact_quote)
    }
}

impl SlippageGuard {
    /// Smallest output to accept for a quoted `desired_output`
    pub fn minimum_output(&self, desired_output: impl Numeric) -> Option<Decimal> {
        minimum_acceptable_output(desired_output, &self.allowed_slippage)
    }
}

/// `desired_output * (1 - allowed_slippage)`, floored to whole units and never
/// below 1.
///
/// `None` unless `desired_output > 0` and `0 <= allowed_slippage <= 1`.
pub fn minimum_acceptable_output(
    desired_output: impl Numeric,
    allowed_slippage: impl Numeric,
) -> Option<Decimal> {
    settle(
        "minimum_acceptable_output",
        try_minimum_acceptable_output(desired_output, allowed_slippage),
    )
}

fn try_minimum_acceptable_output<D: Numeric, S: Numeric>(
    desired_output: D,
    allowed_slippage: S,
) -> Result<Decimal> {
    let desired = validate::positive("desired_output", desired_output)?;
    let slippage = validate::numeric("allowed_slippage", allowed_slippage)?;
    if slippage.is_negative() || slippage > Decimal::one() {
        return Err(PricingError::SlippageOutOfRange(slippage));
    }

    let output_scale = Decimal::from(OUTPUT_SCALE);
    let slippage_scale = Decimal::from(SLIPPAGE_SCALE);

    let scaled_output = &desired * &output_scale;
    let scaled_slippage = &slippage * &slippage_scale;
    let deduction = validate::divide(
        "minimum_acceptable_output",
        &(&scaled_output * &scaled_slippage),
        &slippage_scale,
    )?;
    let minimum = validate::divide(
        "minimum_acceptable_output",
        &(scaled_output - deduction),
        &output_scale,
    )?;

    Ok(minimum.floor().max(Decimal::one()))
}

fn try_market_rate(
    direction: Direction,
    reserves: &PoolReserves,
    base_decimals: u8,
    quote_decimals: u8,
) -> Result<Decimal> {
    let base = validate::positive("base_reserve", &reserves.base)?;
    let quote = validate::positive("quote_reserve", &reserves.quote)?;

    let (input, output, input_decimals, output_decimals) = match direction {
        Direction::BaseToQuote => (base, quote, base_decimals, quote_decimals),
        Direction::QuoteToBase => (quote, base, quote_decimals, base_decimals),
    };
    let raw_rate = validate::divide("market_rate", &output, &input)?;
    Ok(rescale(&raw_rate, input_decimals, output_decimals))
}

/// Convert a smallest-unit rate (output per input) into a whole-token rate
fn rescale(rate: &Decimal, input_decimals: u8, output_decimals: u8) -> Decimal {
    rate.shift(i32::from(input_decimals) - i32::from(output_decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn engine() -> PricingEngine {
        PricingEngine::new(EngineConfig::default())
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_minimum_output_examples() {
        assert_eq!(minimum_acceptable_output(100u64, "0.5"), Some(Decimal::from(50u64)));
        assert_eq!(minimum_acceptable_output(100u64, "1.5"), None);
        assert_eq!(minimum_acceptable_output(100u64, "-0.1"), None);
        assert_eq!(minimum_acceptable_output(100u64, "0"), Some(Decimal::from(100u64)));
        assert_eq!(minimum_acceptable_output(1_000u64, "0.005"), Some(Decimal::from(995u64)));
        assert_eq!(minimum_acceptable_output(0u64, "0.5"), None);
        assert_eq!(minimum_acceptable_output("many", "0.5"), None);
    }

    #[test]
    fn test_minimum_output_is_clamped_to_one() {
        assert_eq!(minimum_acceptable_output(100u64, "1"), Some(Decimal::one()));
        assert_eq!(minimum_acceptable_output(1u64, "0.9"), Some(Decimal::one()));
        assert_eq!(minimum_acceptable_output("0.4", "0"), Some(Decimal::one()));
    }

    #[test]
    fn test_minimum_output_floors_fractions() {
        assert_eq!(minimum_acceptable_output("998.7", "0"), Some(Decimal::from(998u64)));
        assert_eq!(minimum_acceptable_output(999u64, "0.001"), Some(Decimal::from(998u64)));
    }

    #[test]
    fn test_slippage_guard_delegates() {
        let guard = SlippageGuard::new("0.5").unwrap();
        assert_eq!(guard.minimum_output(100u64), Some(Decimal::from(50u64)));
    }

    #[test]
    fn test_effective_rate_is_output_over_input() {
        let e = engine();
        let reserves = PoolReserves::new(1_000_000u64, 2_000_000u64);
        let output = e.quote_output_for_base_input(10_000u64, &reserves).unwrap();
        let rate = e
            .effective_exchange_rate(Direction::BaseToQuote, 10_000u64, &reserves)
            .unwrap();
        assert_eq!(rate, output.checked_div(&Decimal::from(10_000u64)).unwrap());
        assert_eq!(e.effective_exchange_rate(Direction::BaseToQuote, 0u64, &reserves), None);
    }

    #[test]
    fn test_display_rate_accounts_for_decimals() {
        let e = engine();
        let reserves = PoolReserves::new(1_000_000u64, 2_000_000u64);
        let raw = e
            .effective_exchange_rate(Direction::BaseToQuote, 10_000u64, &reserves)
            .unwrap();
        let shown = e
            .display_exchange_rate(Direction::BaseToQuote, 10_000u64, &reserves, 6, 8)
            .unwrap();
        assert_eq!(shown, raw.checked_div(&Decimal::from(100u64)).unwrap());
    }

    #[test]
    fn test_market_rate_ignores_fees_and_subsidy() {
        let e = PricingEngine::liquidity_baking();
        // 4000 base tokens (6 dp) against 1 quote token (8 dp)
        let reserves = PoolReserves::new(4_000_000_000u64, 100_000_000u64);
        assert_eq!(
            e.market_rate(Direction::BaseToQuote, &reserves, 6, 8),
            Some(dec("0.00025"))
        );
        assert_eq!(
            e.market_rate(Direction::QuoteToBase, &reserves, 6, 8),
            Some(Decimal::from(4_000u64))
        );
        assert_eq!(
            e.market_rate(Direction::BaseToQuote, &PoolReserves::new(0u64, 1u64), 6, 8),
            None
        );
    }

    #[test]
    fn test_price_impact_base_to_quote() {
        let e = engine();
        let reserves = PoolReserves::new(1_000u64, 1_000u64);
        let impact = e
            .price_impact(Direction::BaseToQuote, 1_000u64, &reserves)
            .unwrap();

        // in net of burn = 999, bought = 999 * 1000 / 1999, ideal = 1000
        let bought = Decimal::from_ratio(999_000u64, 1_999u64).unwrap();
        let ideal = Decimal::from(1_000u64);
        let expected = (&ideal - &bought).checked_div(&ideal).unwrap();
        assert_eq!(impact, expected);
    }

    #[test]
    fn test_price_impact_quote_to_base() {
        let e = engine();
        let reserves = PoolReserves::new(2_000u64, 1_000u64);
        let impact = e
            .price_impact(Direction::QuoteToBase, 500u64, &reserves)
            .unwrap();

        // gross = 500 * 2000 / 1500, net of burn * 0.999, ideal = 2 * 500
        let net = Decimal::from_ratio(2_000u64, 3u64).unwrap() * dec("0.999");
        let ideal = Decimal::from(1_000u64);
        let expected = (&ideal - &net).checked_div(&ideal).unwrap();
        assert_eq!(impact, expected);
    }

    #[test]
    fn test_price_impact_small_trade_is_near_zero() {
        let e = engine();
        let reserves = PoolReserves::new(1_000_000_000_000u64, 1_000_000_000_000u64);
        let impact = e
            .price_impact(Direction::BaseToQuote, 1u64, &reserves)
            .unwrap();
        assert!(!impact.is_negative());
        // the burn alone costs 0.1%
        assert!(impact < dec("0.0011"));
    }

    #[test]
    fn test_price_impact_rejects_invalid_input() {
        let e = engine();
        let reserves = PoolReserves::new(1_000u64, 1_000u64);
        assert_eq!(e.price_impact(Direction::QuoteToBase, 0u64, &reserves), None);
        assert_eq!(
            e.price_impact(Direction::QuoteToBase, 10u64, &PoolReserves::new(1_000u64, 0u64)),
            None
        );
    }
}
