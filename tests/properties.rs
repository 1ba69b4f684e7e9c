use proptest::prelude::*;

use rwa_settlement::{
    check_apy_claim, estimate_returns, InMemoryLedger, Instruction, LedgerClient,
    SettlementCalculator, SettlementConfig, SettlementError,
};

fn default_calculator() -> SettlementCalculator {
    SettlementCalculator::new(SettlementConfig::default()).unwrap()
}

fn arb_config() -> impl Strategy<Value = SettlementConfig> {
    (
        1u64..=1_000_000_000_000,
        0u16..=10_000,
        0u16..10_000,
        0u64..=1_000_000_000_000,
        1u64..=65_535,
        1u8..=31,
    )
        .prop_map(
            |(token_price, primary_fee_bps, secondary_fee_bps, penalty, units, day)| {
                SettlementConfig {
                    token_price,
                    primary_fee_bps,
                    secondary_fee_bps,
                    early_sale_penalty: penalty,
                    total_units_per_asset: units,
                    distribution_day: day,
                }
            },
        )
}

proptest! {
    #[test]
    fn primary_total_is_base_plus_floored_fee(units in 1u64..=1_000_000) {
        let calc = default_calculator();
        let b = calc.compute_primary_purchase(units).unwrap();
        let base = units * 120_000_000;
        let fee = (base as u128 * 300 / 10_000) as u64;
        prop_assert_eq!(b.base_cost, base);
        prop_assert_eq!(b.fee, fee);
        prop_assert_eq!(b.total_buyer_pays, base + fee);
        prop_assert_eq!(b.seller_receives, base);
        prop_assert_eq!(b.platform_receives, fee);
    }

    #[test]
    fn floor_listing_never_loses_money(config in arb_config()) {
        let calc = SettlementCalculator::new(config.clone()).unwrap();
        let floor = calc.compute_minimum_resale_price();
        let b = calc.compute_secondary_purchase(floor, 1).unwrap();
        prop_assert!(b.seller_receives >= config.token_price);
        prop_assert!(b.is_balanced());
    }

    #[test]
    fn valid_listings_have_non_negative_proceeds(
        extra in 0u64..=10_000_000_000,
        units in 1u64..=10_000,
    ) {
        let calc = default_calculator();
        let price = calc.compute_minimum_resale_price() + extra;
        prop_assert!(calc.validate_listing_price(price).is_ok());
        let b = calc.compute_secondary_purchase(price, units).unwrap();
        prop_assert!(b.is_balanced());
        prop_assert_eq!(b.seller_receives, price * units - 25_000_000 * units);
    }

    #[test]
    fn validate_fails_iff_below_floor(price in 0u64..=400_000_000) {
        let calc = default_calculator();
        let floor = calc.compute_minimum_resale_price();
        let rejected = matches!(
            calc.validate_listing_price(price),
            Err(SettlementError::PriceTooLow { .. })
        );
        prop_assert_eq!(rejected, price < floor);
    }

    #[test]
    fn floor_is_smallest_price_clearing_cost(config in arb_config()) {
        // One lamport below the floor cannot cover price + penalty after the fee.
        let calc = SettlementCalculator::new(config.clone()).unwrap();
        let floor = calc.compute_minimum_resale_price() as u128;
        let cost = (config.token_price + config.early_sale_penalty) as u128;
        let keep = 10_000 - config.secondary_fee_bps as u128;
        prop_assert!(floor * keep >= cost * 10_000);
        prop_assert!(floor == 0 || (floor - 1) * keep < cost * 10_000);
    }

    #[test]
    fn gate_true_only_on_distribution_day(config in arb_config(), day in 1u8..=31) {
        let calc = SettlementCalculator::new(config.clone()).unwrap();
        prop_assert_eq!(calc.can_claim_distribution(day), day == config.distribution_day);
    }

    #[test]
    fn breakdowns_are_bit_identical(price in 25_000_000u64..=1_000_000_000, units in 1u64..=1_000) {
        let calc = default_calculator();
        let a = calc.compute_secondary_purchase(price, units).unwrap();
        let b = calc.compute_secondary_purchase(price, units).unwrap();
        prop_assert_eq!(a.content_hash, b.content_hash);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn secondary_is_balanced_or_rejected(price in any::<u64>(), units in 1u64..=100_000) {
        let calc = default_calculator();
        match calc.compute_secondary_purchase(price, units) {
            Ok(b) => prop_assert!(b.is_balanced()),
            Err(SettlementError::NegativeProceeds { subtotal, penalty }) => {
                prop_assert!(subtotal < penalty)
            }
            Err(SettlementError::Overflow) => {}
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn distribution_share_never_exceeds_pool(pool in any::<u64>(), units in 1u64..=1_000) {
        let calc = default_calculator();
        let share = calc.compute_distribution_share(pool, units).unwrap();
        prop_assert!(share <= pool);
        prop_assert_eq!(share, (pool as u128 * units as u128 / 1_000) as u64);
    }

    #[test]
    fn apy_claim_accepted_iff_pool_covers_it(
        units in 1u64..=65_535,
        apy in 0u16..=1_000,
        pool in 0u64..=1_000_000,
    ) {
        let owed = units * apy as u64 / 100;
        match check_apy_claim(units, apy, pool) {
            Ok(amount) => {
                prop_assert_eq!(amount, owed);
                prop_assert!(amount <= pool);
            }
            Err(err) => {
                prop_assert_eq!(err, SettlementError::InsufficientFunds { required: owed, available: pool });
                prop_assert!(owed > pool);
            }
        }
    }

    #[test]
    fn estimate_grows_with_days(amount in 0u64..=u64::MAX / 1_000, apy in 0u16..=100, days in 0u32..=3_650) {
        let earlier = estimate_returns(amount, apy, days).unwrap();
        let later = estimate_returns(amount, apy, days + 1).unwrap();
        prop_assert!(earlier <= later);
    }

    #[test]
    fn ledger_settles_what_was_quoted(buys in proptest::collection::vec(1u64..=200, 1..12)) {
        let calc = default_calculator();
        let mut ledger = InMemoryLedger::new(calc.clone());
        let sale = rwa_settlement::Address::repeat(1);
        let treasury = rwa_settlement::Address::repeat(2);
        ledger.init_sale(sale, treasury).unwrap();

        let mut expected_seller = 0u64;
        let mut expected_platform = 0u64;
        let mut sold = 0u64;
        for units in buys {
            let quoted = rwa_settlement::quote_primary(&ledger, &calc, &sale, units);
            let submitted = ledger.submit(&Instruction::BuyPrimary { sale, units });
            match quoted {
                Ok(b) => {
                    prop_assert!(submitted.is_ok());
                    expected_seller += b.seller_receives;
                    expected_platform += b.platform_receives;
                    sold += units;
                }
                Err(_) => prop_assert!(submitted.is_err()),
            }
        }

        let record = ledger.fetch_sale(&sale).unwrap();
        prop_assert_eq!(record.tokens_sold, sold);
        prop_assert_eq!(record.active, sold < 1_000);
        prop_assert_eq!(ledger.credited(&treasury), expected_seller);
        prop_assert_eq!(ledger.platform_collected(), expected_platform);
    }
}
