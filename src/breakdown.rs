/*
    RWA-Settlement
    Copyright (C) 2026 Moroya Sakamoto
*/

use serde::Serialize;

use crate::fnv1a;

/// Which market a purchase settles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Market {
    /// Initial sale from the issuing treasury.
    Primary = 0,
    /// Peer-to-peer resale through an escrow-backed listing.
    Secondary = 1,
}

/// Every monetary quantity of one purchase, in lamports.
///
/// Always recomputed from current constants and freshly fetched inputs.
/// `total_buyer_pays == seller_receives + platform_receives` holds for every
/// breakdown the calculator produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementBreakdown {
    /// Market the purchase settles in.
    pub market: Market,
    /// Units bought.
    pub units: u64,
    /// Price per unit.
    pub unit_price: u64,
    /// `units * unit_price`.
    pub base_cost: u64,
    /// Platform fee, floored.
    pub fee: u64,
    /// Early-sale penalty withheld from the seller (zero in the primary market).
    pub penalty: u64,
    /// Amount debited from the buyer.
    pub total_buyer_pays: u64,
    /// Amount credited to the seller (treasury in the primary market).
    pub seller_receives: u64,
    /// Amount credited to the platform.
    pub platform_receives: u64,
    /// Deterministic content hash.
    pub content_hash: u64,
}

impl SettlementBreakdown {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        market: Market,
        units: u64,
        unit_price: u64,
        base_cost: u64,
        fee: u64,
        penalty: u64,
        total_buyer_pays: u64,
        seller_receives: u64,
        platform_receives: u64,
    ) -> Self {
        let mut data = [0u8; 65];
        data[0] = market as u8;
        for (i, v) in [
            units,
            unit_price,
            base_cost,
            fee,
            penalty,
            total_buyer_pays,
            seller_receives,
            platform_receives,
        ]
        .iter()
        .enumerate()
        {
            let at = 1 + i * 8;
            data[at..at + 8].copy_from_slice(&v.to_le_bytes());
        }

        Self {
            market,
            units,
            unit_price,
            base_cost,
            fee,
            penalty,
            total_buyer_pays,
            seller_receives,
            platform_receives,
            content_hash: fnv1a(&data),
        }
    }

    /// True when buyer debit equals the sum of seller and platform credits.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.seller_receives as u128 + self.platform_receives as u128
            == self.total_buyer_pays as u128
    }
}
