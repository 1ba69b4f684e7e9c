// RWA-Settlement — Primary and secondary purchase settlement arithmetic
// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Moroya Sakamoto

use crate::breakdown::{Market, SettlementBreakdown};
use crate::config::{SettlementConfig, BPS_DENOMINATOR};
use crate::error::{ConfigError, Result, SettlementError};

// ── Settlement Calculator ──────────────────────────────────────────────

/// Pure settlement calculator for one deployment.
///
/// Reproduces the integer arithmetic the settlement programs enforce: fees
/// are floored, the resale floor is rounded up, and nothing is clamped. The
/// calculator holds only immutable configuration, so one instance can be
/// shared freely across threads and in-flight requests.
#[derive(Debug, Clone)]
pub struct SettlementCalculator {
    config: SettlementConfig,
    /// Derived from `config` once; the constants never change afterwards.
    minimum_resale_price: u64,
}

impl SettlementCalculator {
    /// Validate the configuration and build a calculator.
    pub fn new(config: SettlementConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let minimum_resale_price = config
            .minimum_resale_price()
            .ok_or(ConfigError::MinimumResaleOverflow)?;
        Ok(Self {
            config,
            minimum_resale_price,
        })
    }

    /// Cost of buying `units` from the primary sale.
    ///
    /// The caller must still check the sale record (`SaleClosed`, `SoldOut`)
    /// before submitting.
    pub fn compute_primary_purchase(&self, units: u64) -> Result<SettlementBreakdown> {
        if units == 0 {
            return Err(SettlementError::InvalidAmount { units });
        }

        let base_cost = checked_mul(units, self.config.token_price)?;
        let fee = bps_of(base_cost, self.config.primary_fee_bps)?;
        let total = base_cost.checked_add(fee).ok_or(SettlementError::Overflow)?;

        Ok(SettlementBreakdown::new(
            Market::Primary,
            units,
            self.config.token_price,
            base_cost,
            fee,
            0,
            total,
            base_cost,
            fee,
        ))
    }

    /// Lowest price per unit a new listing may ask.
    ///
    /// At this price a reseller's proceeds for one unit are never below the
    /// original token price.
    #[inline]
    pub fn compute_minimum_resale_price(&self) -> u64 {
        self.minimum_resale_price
    }

    /// Reject listing prices below [`compute_minimum_resale_price`].
    ///
    /// [`compute_minimum_resale_price`]: Self::compute_minimum_resale_price
    pub fn validate_listing_price(&self, price_per_unit: u64) -> Result<()> {
        if price_per_unit < self.minimum_resale_price {
            return Err(SettlementError::PriceTooLow {
                price: price_per_unit,
                minimum: self.minimum_resale_price,
            });
        }
        Ok(())
    }

    /// Split of buying `units` from a listing priced at `price_per_unit`.
    ///
    /// The buyer pays subtotal plus fee; the seller receives the subtotal
    /// less the per-unit penalty; the platform collects penalty and fee. The
    /// caller must still check the listing record (`ListingInactive`,
    /// `InsufficientListingAmount`) before submitting.
    pub fn compute_secondary_purchase(
        &self,
        price_per_unit: u64,
        units: u64,
    ) -> Result<SettlementBreakdown> {
        if units == 0 {
            return Err(SettlementError::InvalidAmount { units });
        }

        let subtotal = checked_mul(price_per_unit, units)?;
        let fee = bps_of(subtotal, self.config.secondary_fee_bps)?;
        let penalty = checked_mul(self.config.early_sale_penalty, units)?;

        let seller = subtotal
            .checked_sub(penalty)
            .ok_or(SettlementError::NegativeProceeds { subtotal, penalty })?;
        let platform = penalty.checked_add(fee).ok_or(SettlementError::Overflow)?;
        let total = subtotal.checked_add(fee).ok_or(SettlementError::Overflow)?;

        Ok(SettlementBreakdown::new(
            Market::Secondary,
            units,
            price_per_unit,
            subtotal,
            fee,
            penalty,
            total,
            seller,
            platform,
        ))
    }

    /// Calendar gate for monthly distribution claims.
    #[inline]
    pub fn can_claim_distribution(&self, today_day_of_month: u8) -> bool {
        today_day_of_month == self.config.distribution_day
    }

    /// Access the current configuration.
    #[inline]
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }
}

/// `a * b`, failing if the product does not fit in 64 bits.
#[inline]
pub(crate) fn checked_mul(a: u64, b: u64) -> Result<u64> {
    let wide = a as u128 * b as u128;
    u64::try_from(wide).map_err(|_| SettlementError::Overflow)
}

/// `floor(amount * bps / 10000)`.
#[inline]
fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    let wide = amount as u128 * bps as u128 / BPS_DENOMINATOR as u128;
    u64::try_from(wide).map_err(|_| SettlementError::Overflow)
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

    fn default_calculator() -> SettlementCalculator {
        SettlementCalculator::new(SettlementConfig::default()).unwrap()
    }

    #[test]
    fn primary_purchase_ten_units() {
        let calc = default_calculator();
        let b = calc.compute_primary_purchase(10).unwrap();

        // 10 * 0.12 SOL = 1.2 SOL, 3% = 0.036 SOL
        assert_eq!(b.market, Market::Primary);
        assert_eq!(b.base_cost, 1_200_000_000);
        assert_eq!(b.fee, 36_000_000);
        assert_eq!(b.total_buyer_pays, 1_236_000_000);
        assert_eq!(b.seller_receives, 1_200_000_000);
        assert_eq!(b.platform_receives, 36_000_000);
        assert_eq!(b.penalty, 0);
        assert_eq!(b.total_buyer_pays, 1_236 * LAMPORTS_PER_SOL / 1_000);
    }

    #[test]
    fn primary_purchase_zero_units() {
        let calc = default_calculator();
        assert_eq!(
            calc.compute_primary_purchase(0),
            Err(SettlementError::InvalidAmount { units: 0 })
        );
    }

    #[test]
    fn primary_fee_is_floored() {
        let calc = SettlementCalculator::new(SettlementConfig {
            token_price: 333,
            primary_fee_bps: 300,
            ..SettlementConfig::default()
        })
        .unwrap();
        let b = calc.compute_primary_purchase(1).unwrap();
        // 333 * 300 / 10000 = 9.99
        assert_eq!(b.fee, 9);
        assert_eq!(b.total_buyer_pays, 342);
    }

    #[test]
    fn primary_purchase_overflow() {
        let calc = default_calculator();
        assert_eq!(
            calc.compute_primary_purchase(u64::MAX),
            Err(SettlementError::Overflow)
        );
    }

    #[test]
    fn minimum_resale_price_default() {
        let calc = default_calculator();
        // (0.12 + 0.025) / 0.97 = 0.149484536... SOL, rounded up
        assert_eq!(calc.compute_minimum_resale_price(), 149_484_537);
    }

    #[test]
    fn minimum_resale_price_is_stable() {
        let calc = default_calculator();
        let first = calc.compute_minimum_resale_price();
        for _ in 0..10 {
            assert_eq!(calc.compute_minimum_resale_price(), first);
        }
    }

    #[test]
    fn validate_listing_price_boundary() {
        let calc = default_calculator();
        let min = calc.compute_minimum_resale_price();
        assert!(calc.validate_listing_price(min).is_ok());
        assert!(calc.validate_listing_price(min + 1).is_ok());
        assert_eq!(
            calc.validate_listing_price(min - 1),
            Err(SettlementError::PriceTooLow {
                price: min - 1,
                minimum: min
            })
        );
        assert!(calc.validate_listing_price(0).is_err());
    }

    #[test]
    fn secondary_purchase_at_floor() {
        let calc = default_calculator();
        let min = calc.compute_minimum_resale_price();
        let b = calc.compute_secondary_purchase(min, 1).unwrap();

        assert_eq!(b.market, Market::Secondary);
        assert_eq!(b.base_cost, 149_484_537);
        assert_eq!(b.fee, 4_484_536); // floor(149_484_537 * 0.03)
        assert_eq!(b.penalty, 25_000_000);
        assert_eq!(b.seller_receives, 124_484_537);
        assert_eq!(b.platform_receives, 29_484_536);
        assert_eq!(b.total_buyer_pays, 153_969_073);
        assert!(b.is_balanced());
        // Seller recovers at least the primary price
        assert!(b.seller_receives >= calc.config().token_price);
    }

    #[test]
    fn secondary_purchase_multiple_units() {
        let calc = default_calculator();
        let b = calc.compute_secondary_purchase(200_000_000, 3).unwrap();

        assert_eq!(b.base_cost, 600_000_000);
        assert_eq!(b.fee, 18_000_000);
        assert_eq!(b.penalty, 75_000_000);
        assert_eq!(b.seller_receives, 525_000_000);
        assert_eq!(b.platform_receives, 93_000_000);
        assert_eq!(b.total_buyer_pays, 618_000_000);
    }

    #[test]
    fn secondary_purchase_negative_proceeds() {
        let calc = default_calculator();
        assert_eq!(
            calc.compute_secondary_purchase(1_000, 2),
            Err(SettlementError::NegativeProceeds {
                subtotal: 2_000,
                penalty: 50_000_000
            })
        );
    }

    #[test]
    fn secondary_purchase_price_equal_to_penalty() {
        let calc = default_calculator();
        let b = calc.compute_secondary_purchase(25_000_000, 4).unwrap();
        assert_eq!(b.seller_receives, 0);
        assert!(b.is_balanced());
    }

    #[test]
    fn secondary_purchase_zero_units() {
        let calc = default_calculator();
        assert_eq!(
            calc.compute_secondary_purchase(200_000_000, 0),
            Err(SettlementError::InvalidAmount { units: 0 })
        );
    }

    #[test]
    fn secondary_purchase_overflow() {
        let calc = default_calculator();
        assert_eq!(
            calc.compute_secondary_purchase(u64::MAX, 2),
            Err(SettlementError::Overflow)
        );
    }

    #[test]
    fn distribution_gate_every_day() {
        let calc = default_calculator();
        for day in 1..=31u8 {
            assert_eq!(calc.can_claim_distribution(day), day == 20);
        }
        assert!(!calc.can_claim_distribution(0));
    }

    #[test]
    fn compute_is_idempotent() {
        let calc = default_calculator();
        let a = calc.compute_secondary_purchase(160_000_000, 7).unwrap();
        let b = calc.compute_secondary_purchase(160_000_000, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.content_hash, b.content_hash);

        let p1 = calc.compute_primary_purchase(42).unwrap();
        let p2 = calc.compute_primary_purchase(42).unwrap();
        assert_eq!(p1, p2);
    }

    #[test]
    fn invalid_config_rejected() {
        let err = SettlementCalculator::new(SettlementConfig {
            secondary_fee_bps: 10_000,
            ..SettlementConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::FeeOutOfRange { .. }));
    }

    #[test]
    fn calculator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SettlementCalculator>();
    }
}
