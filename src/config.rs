// RWA-Settlement — Deployment constants
// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Moroya Sakamoto

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Basis-point denominator (1 bps = 1/10000).
pub const BPS_DENOMINATOR: u64 = 10_000;

const ENV_TOKEN_PRICE: &str = "RWA_TOKEN_PRICE";
const ENV_PRIMARY_FEE_BPS: &str = "RWA_PRIMARY_FEE_BPS";
const ENV_SECONDARY_FEE_BPS: &str = "RWA_SECONDARY_FEE_BPS";
const ENV_EARLY_SALE_PENALTY: &str = "RWA_EARLY_SALE_PENALTY";
const ENV_TOTAL_UNITS_PER_ASSET: &str = "RWA_TOTAL_UNITS_PER_ASSET";
const ENV_DISTRIBUTION_DAY: &str = "RWA_DISTRIBUTION_DAY";

// ── Configuration ──────────────────────────────────────────────────────

/// Settlement constants for one deployment.
///
/// These must match the values compiled into the settlement programs the
/// client talks to. Amounts are in lamports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettlementConfig {
    /// Primary-market price per unit.
    pub token_price: u64,
    /// Platform fee charged on top of primary purchases.
    pub primary_fee_bps: u16,
    /// Platform fee charged on top of secondary purchases.
    pub secondary_fee_bps: u16,
    /// Flat per-unit penalty deducted from a reseller's proceeds.
    pub early_sale_penalty: u64,
    /// Fractional units one physical asset is divided into.
    pub total_units_per_asset: u64,
    /// Day of month on which distribution claims are accepted.
    pub distribution_day: u8,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            token_price: 120_000_000,
            primary_fee_bps: 300,
            secondary_fee_bps: 300,
            early_sale_penalty: 25_000_000,
            total_units_per_asset: 1_000,
            distribution_day: 20,
        }
    }
}

impl SettlementConfig {
    /// Overlay `RWA_*` environment variables on the defaults and validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable source on the defaults.
    ///
    /// Unset variables keep their default value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, ENV_TOKEN_PRICE)? {
            config.token_price = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_PRIMARY_FEE_BPS)? {
            config.primary_fee_bps = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_SECONDARY_FEE_BPS)? {
            config.secondary_fee_bps = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_EARLY_SALE_PENALTY)? {
            config.early_sale_penalty = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_TOTAL_UNITS_PER_ASSET)? {
            config.total_units_per_asset = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_DISTRIBUTION_DAY)? {
            config.distribution_day = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config document. All fields are required.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check every constant against the ranges the settlement math needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_price == 0 {
            return Err(ConfigError::ZeroTokenPrice);
        }
        if self.total_units_per_asset == 0 {
            return Err(ConfigError::ZeroTotalUnits);
        }
        if self.total_units_per_asset > u16::MAX as u64 {
            return Err(ConfigError::TotalUnitsOutOfRange(
                self.total_units_per_asset,
            ));
        }
        if self.primary_fee_bps as u64 > BPS_DENOMINATOR {
            return Err(ConfigError::FeeOutOfRange {
                field: "primary_fee_bps",
                bps: self.primary_fee_bps,
                max: BPS_DENOMINATOR as u16,
            });
        }
        // A 100% secondary fee would make the resale floor infinite.
        if self.secondary_fee_bps as u64 >= BPS_DENOMINATOR {
            return Err(ConfigError::FeeOutOfRange {
                field: "secondary_fee_bps",
                bps: self.secondary_fee_bps,
                max: BPS_DENOMINATOR as u16 - 1,
            });
        }
        if !(1..=31).contains(&self.distribution_day) {
            return Err(ConfigError::DistributionDayOutOfRange(
                self.distribution_day,
            ));
        }
        if self.minimum_resale_price().is_none() {
            return Err(ConfigError::MinimumResaleOverflow);
        }
        Ok(())
    }

    /// `ceil((token_price + penalty) * 10000 / (10000 - secondary_fee_bps))`.
    ///
    /// `None` if the fee is 100% or the result does not fit in 64 bits.
    pub(crate) fn minimum_resale_price(&self) -> Option<u64> {
        let denominator = BPS_DENOMINATOR.checked_sub(self.secondary_fee_bps as u64)?;
        if denominator == 0 {
            return None;
        }
        let cost = self.token_price as u128 + self.early_sale_penalty as u128;
        let numerator = cost * BPS_DENOMINATOR as u128;
        let denominator = denominator as u128;
        let floor = numerator.div_ceil(denominator);
        u64::try_from(floor).ok()
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar { name, value: raw }),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
