// RWA-Settlement — Monthly distributions and APY pools
// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Moroya Sakamoto

use crate::calculator::SettlementCalculator;
use crate::error::{Result, SettlementError};

const SECONDS_PER_DAY: i64 = 86_400;
const DAYS_PER_YEAR: u128 = 365;
const PERCENT: u128 = 100;

impl SettlementCalculator {
    /// Pro-rata share of `pool_balance` for a holder of `units_held` units.
    ///
    /// `floor(pool_balance * units_held / total_units_per_asset)`. Holders
    /// must own between one unit and the whole asset.
    pub fn compute_distribution_share(&self, pool_balance: u64, units_held: u64) -> Result<u64> {
        let total_units = self.config().total_units_per_asset;
        if units_held == 0 || units_held > total_units {
            return Err(SettlementError::InvalidAmount { units: units_held });
        }
        let wide = pool_balance as u128 * units_held as u128 / total_units as u128;
        // units_held <= total_units, so the share never exceeds the pool.
        u64::try_from(wide).map_err(|_| SettlementError::Overflow)
    }

    /// Gate a claim on the calendar day, then compute the share.
    pub fn claim_distribution(
        &self,
        today_day_of_month: u8,
        pool_balance: u64,
        units_held: u64,
    ) -> Result<u64> {
        if !self.can_claim_distribution(today_day_of_month) {
            return Err(SettlementError::WrongDistributionDay {
                today: today_day_of_month,
                distribution_day: self.config().distribution_day,
            });
        }
        self.compute_distribution_share(pool_balance, units_held)
    }
}

// ── APY pools ──────────────────────────────────────────────────────────

/// Simple-interest projection of what `amount` earns at `apy_percent` over
/// `days_held` days: `floor(amount * apy_percent * days_held / (100 * 365))`.
///
/// No compounding, and a year is always 365 days.
pub fn estimate_returns(amount: u64, apy_percent: u16, days_held: u32) -> Result<u64> {
    let wide = amount as u128 * apy_percent as u128 * days_held as u128;
    u64::try_from(wide / (PERCENT * DAYS_PER_YEAR)).map_err(|_| SettlementError::Overflow)
}

/// Returns owed to `units` from an APY pool, `floor(units * apy_percent / 100)`.
///
/// Fails with `InsufficientFunds` when the pool holds less than that.
pub fn check_apy_claim(units: u64, apy_percent: u16, pool_total: u64) -> Result<u64> {
    if units == 0 {
        return Err(SettlementError::InvalidAmount { units });
    }
    let wide = units as u128 * apy_percent as u128 / PERCENT;
    let required = u64::try_from(wide).map_err(|_| SettlementError::Overflow)?;
    if required > pool_total {
        return Err(SettlementError::InsufficientFunds {
            required,
            available: pool_total,
        });
    }
    Ok(required)
}

/// UTC calendar day of month (1-31) for a Unix timestamp in seconds.
///
/// Proleptic Gregorian calendar; negative timestamps count back from 1970.
pub fn day_of_month_utc(unix_seconds: i64) -> u8 {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year.
    let z = unix_seconds.div_euclid(SECONDS_PER_DAY) + 719_468;
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    (doy - (153 * mp + 2) / 5 + 1) as u8
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettlementConfig;

    fn default_calculator() -> SettlementCalculator {
        SettlementCalculator::new(SettlementConfig::default()).unwrap()
    }

    #[test]
    fn share_is_pro_rata() {
        let calc = default_calculator();
        // 50 of 1000 units -> 5% of the pool
        assert_eq!(calc.compute_distribution_share(2_000_000_000, 50).unwrap(), 100_000_000);
    }

    #[test]
    fn share_is_floored() {
        let calc = default_calculator();
        // 999 * 1 / 1000 = 0.999
        assert_eq!(calc.compute_distribution_share(999, 1).unwrap(), 0);
        assert_eq!(calc.compute_distribution_share(1_001, 1).unwrap(), 1);
    }

    #[test]
    fn whole_asset_takes_whole_pool() {
        let calc = default_calculator();
        assert_eq!(calc.compute_distribution_share(u64::MAX, 1_000).unwrap(), u64::MAX);
    }

    #[test]
    fn share_rejects_bad_holdings() {
        let calc = default_calculator();
        assert_eq!(
            calc.compute_distribution_share(1_000, 0),
            Err(SettlementError::InvalidAmount { units: 0 })
        );
        assert_eq!(
            calc.compute_distribution_share(1_000, 1_001),
            Err(SettlementError::InvalidAmount { units: 1_001 })
        );
    }

    #[test]
    fn claim_on_distribution_day() {
        let calc = default_calculator();
        assert_eq!(calc.claim_distribution(20, 10_000, 100).unwrap(), 1_000);
    }

    #[test]
    fn claim_on_other_day_fails() {
        let calc = default_calculator();
        for day in (1..=31u8).filter(|d| *d != 20) {
            assert_eq!(
                calc.claim_distribution(day, 10_000, 100),
                Err(SettlementError::WrongDistributionDay {
                    today: day,
                    distribution_day: 20
                })
            );
        }
    }

    #[test]
    fn estimate_full_year() {
        // 12% of 1 SOL over 365 days
        assert_eq!(estimate_returns(1_000_000_000, 12, 365).unwrap(), 120_000_000);
    }

    #[test]
    fn estimate_partial_year_is_floored() {
        // 1e9 * 12 * 30 / 36_500 = 9_863_013.69...
        assert_eq!(estimate_returns(1_000_000_000, 12, 30).unwrap(), 9_863_013);
        assert_eq!(estimate_returns(1_000_000_000, 12, 0).unwrap(), 0);
        assert_eq!(estimate_returns(1_000_000_000, 0, 365).unwrap(), 0);
    }

    #[test]
    fn estimate_overflow() {
        assert_eq!(
            estimate_returns(u64::MAX, u16::MAX, 365),
            Err(SettlementError::Overflow)
        );
        // Large but representable.
        assert_eq!(estimate_returns(u64::MAX, 100, 365).unwrap(), u64::MAX);
    }

    #[test]
    fn apy_claim_within_pool() {
        assert_eq!(check_apy_claim(100, 12, 12).unwrap(), 12);
        assert_eq!(check_apy_claim(100, 12, 1_000).unwrap(), 12);
        // 5 * 10 / 100 floors to zero
        assert_eq!(check_apy_claim(5, 10, 0).unwrap(), 0);
    }

    #[test]
    fn apy_claim_exceeding_pool() {
        let err = check_apy_claim(100, 12, 11).unwrap_err();
        assert_eq!(
            err,
            SettlementError::InsufficientFunds {
                required: 12,
                available: 11
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn apy_claim_zero_units() {
        assert_eq!(
            check_apy_claim(0, 12, 1_000),
            Err(SettlementError::InvalidAmount { units: 0 })
        );
    }

    #[test]
    fn day_of_month_epoch() {
        assert_eq!(day_of_month_utc(0), 1);
        assert_eq!(day_of_month_utc(SECONDS_PER_DAY - 1), 1);
        assert_eq!(day_of_month_utc(SECONDS_PER_DAY), 2);
    }

    #[test]
    fn day_of_month_known_dates() {
        assert_eq!(day_of_month_utc(1_792_454_400), 20); // 2026-10-20
        assert_eq!(day_of_month_utc(1_709_164_800), 29); // 2024-02-29
        assert_eq!(day_of_month_utc(1_709_251_200), 1); // 2024-03-01
        assert_eq!(day_of_month_utc(949_276_800), 31); // 2000-01-31
    }

    #[test]
    fn day_of_month_before_epoch() {
        assert_eq!(day_of_month_utc(-SECONDS_PER_DAY), 31); // 1969-12-31
        assert_eq!(day_of_month_utc(-1), 31);
    }

    #[test]
    fn gate_from_clock_reading() {
        let calc = default_calculator();
        assert!(calc.can_claim_distribution(day_of_month_utc(1_792_454_400 + 3_600)));
        assert!(!calc.can_claim_distribution(day_of_month_utc(1_792_454_400 + SECONDS_PER_DAY)));
    }
}
