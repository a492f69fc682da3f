//! Property tests for the pricing invariants

use cpmm_pricing::{
    minimum_acceptable_output, Decimal, Direction, EngineConfig, PoolReserves, PricingEngine,
};
use proptest::prelude::*;

fn engine(subsidy: bool) -> PricingEngine {
    if subsidy {
        PricingEngine::liquidity_baking()
    } else {
        PricingEngine::new(EngineConfig::default())
    }
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::BaseToQuote), Just(Direction::QuoteToBase)]
}

fn reserves() -> impl Strategy<Value = PoolReserves> {
    (2u64..1_000_000_000_000_000, 2u64..1_000_000_000_000_000)
        .prop_map(|(base, quote)| PoolReserves::new(base, quote))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn rejected_amounts_never_quote(
        subsidy in any::<bool>(),
        direction in direction(),
        pool in reserves(),
        negative in i64::MIN..0,
    ) {
        let engine = engine(subsidy);
        prop_assert_eq!(engine.quote_output(direction, 0u64, &pool), None);
        prop_assert_eq!(engine.quote_output(direction, negative, &pool), None);
        prop_assert_eq!(engine.quote_output(direction, "ten", &pool), None);
        prop_assert_eq!(engine.required_input_for_exact_output(direction, 0u64, &pool, 0), None);
        prop_assert_eq!(engine.price_impact(direction, negative, &pool), None);
    }

    #[test]
    fn larger_inputs_buy_strictly_more(
        subsidy in any::<bool>(),
        direction in direction(),
        pool in reserves(),
        amount in 1u64..1_000_000_000_000,
        extra in 1u64..1_000_000_000_000,
    ) {
        let engine = engine(subsidy);
        let smaller = engine.quote_output(direction, amount, &pool).unwrap();
        let larger = engine.quote_output(direction, amount + extra, &pool).unwrap();
        prop_assert!(smaller.is_positive());
        prop_assert!(smaller < larger);
    }

    #[test]
    fn fees_keep_output_below_market_value(
        direction in direction(),
        pool in reserves(),
        amount in 1u64..1_000_000_000_000,
    ) {
        let engine = engine(false);
        let output = engine.quote_output(direction, amount, &pool).unwrap();
        let market = engine.market_rate(direction, &pool, 0, 0).unwrap();
        prop_assert!(output < market * Decimal::from(amount));
    }

    #[test]
    fn required_input_delivers_the_requested_output(
        subsidy in any::<bool>(),
        direction in direction(),
        pool in reserves(),
        per_mille in 1u64..1_000,
        quote_decimals in 0u8..19,
    ) {
        let engine = engine(subsidy);
        let limit = match direction {
            Direction::BaseToQuote => pool.quote.clone(),
            // half the raw base is always within reach net of fees
            Direction::QuoteToBase => (&pool.base * &Decimal::from_ratio(1u64, 2u64).unwrap()).floor(),
        };
        let wanted = (limit * Decimal::from_ratio(per_mille, 1_000u64).unwrap())
            .floor()
            .max(Decimal::one());

        let required = engine
            .required_input_for_exact_output(direction, &wanted, &pool, quote_decimals)
            .unwrap();
        let delivered = engine.quote_output(direction, &required, &pool).unwrap();
        prop_assert!(delivered >= wanted);
    }

    #[test]
    fn more_slippage_never_raises_the_floor(
        desired in 1u64..1_000_000_000_000,
        tighter in 0u64..=100_000,
        looser in 0u64..=100_000,
    ) {
        let (tighter, looser) = (tighter.min(looser), tighter.max(looser));
        let at_tighter = minimum_acceptable_output(
            desired,
            Decimal::from_ratio(tighter, 100_000u64).unwrap(),
        )
        .unwrap();
        let at_looser = minimum_acceptable_output(
            desired,
            Decimal::from_ratio(looser, 100_000u64).unwrap(),
        )
        .unwrap();

        prop_assert!(at_looser <= at_tighter);
        prop_assert!(at_looser >= Decimal::one());
        prop_assert!(at_tighter <= Decimal::from(desired).max(Decimal::one()));
    }

    #[test]
    fn price_impact_is_a_fraction(
        subsidy in any::<bool>(),
        direction in direction(),
        pool in reserves(),
        amount in 1u64..1_000_000_000_000,
    ) {
        let impact = engine(subsidy).price_impact(direction, amount, &pool).unwrap();
        prop_assert!(!impact.is_negative());
        prop_assert!(impact < Decimal::one());
    }
}
