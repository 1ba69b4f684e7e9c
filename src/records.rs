/*
    RWA-Settlement
    Copyright (C) 2026 Moroya Sakamoto
*/

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Result, SettlementError};

/// 32-byte ledger account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Address whose every byte is `b`. Handy for fixtures.
    #[inline]
    pub const fn repeat(b: u8) -> Self {
        Self([b; 32])
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Primary sale state, as held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleRecord {
    pub authority: Address,
    pub total_tokens: u64,
    pub tokens_sold: u64,
    pub active: bool,
}

impl SaleRecord {
    /// Units still for sale.
    #[inline]
    pub fn available(&self) -> u64 {
        self.total_tokens.saturating_sub(self.tokens_sold)
    }

    /// Check a primary purchase of `units` against this record.
    ///
    /// Fails with `SaleClosed` before `SoldOut`, matching the order the
    /// settlement program evaluates them.
    pub fn check_purchase(&self, units: u64) -> Result<()> {
        if units == 0 {
            return Err(SettlementError::InvalidAmount { units });
        }
        if !self.active {
            return Err(SettlementError::SaleClosed);
        }
        let available = self.available();
        if units > available {
            return Err(SettlementError::SoldOut {
                requested: units,
                available,
            });
        }
        Ok(())
    }
}

/// Secondary-market listing state, as held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRecord {
    pub seller: Address,
    pub price_lamports_per_unit: u64,
    pub amount_remaining: u64,
    pub active: bool,
}

impl ListingRecord {
    /// Check a secondary purchase of `units` against this record.
    pub fn check_purchase(&self, units: u64) -> Result<()> {
        if units == 0 {
            return Err(SettlementError::InvalidAmount { units });
        }
        if !self.active {
            return Err(SettlementError::ListingInactive);
        }
        if units > self.amount_remaining {
            return Err(SettlementError::InsufficientListingAmount {
                requested: units,
                remaining: self.amount_remaining,
            });
        }
        Ok(())
    }
}

/// What a purchase is bought from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "market", content = "address", rename_all = "lowercase")]
pub enum PurchaseTarget {
    /// A primary sale account.
    Sale(Address),
    /// A secondary listing account.
    Listing(Address),
}

/// A user's request to buy, discarded once submitted or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseIntent {
    pub target: PurchaseTarget,
    pub units: u64,
}

impl PurchaseIntent {
    /// Build an intent, rejecting zero units.
    pub fn new(target: PurchaseTarget, units: u64) -> Result<Self> {
        if units == 0 {
            return Err(SettlementError::InvalidAmount { units });
        }
        Ok(Self { target, units })
    }
}
