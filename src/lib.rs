/*
    RWA-Settlement
    Copyright (C) 2026 Moroya Sakamoto
*/

//! # RWA-Settlement
//!
//! Settlement arithmetic for a marketplace of fractional real-world-asset
//! units: primary sales, escrow-backed peer-to-peer resale, early-sale
//! penalties, and monthly distributions. Every figure matches what the
//! on-chain settlement programs enforce, so requests can be rejected
//! client-side before any fee is spent.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | `SettlementConfig` deployment constants (defaults, env, JSON) |
//! | [`calculator`] | `SettlementCalculator`: primary, secondary and resale-floor math |
//! | [`distribution`] | Monthly distribution share, calendar-day gate, APY pools |
//! | [`breakdown`] | `SettlementBreakdown` of buyer, seller and platform amounts |
//! | [`records`] | Sale and listing records with caller-side state checks |
//! | [`ledger`] | Typed account layouts, `LedgerClient`, in-memory ledger |
//! | [`checkout`] | Fetch, check, compute, submit, journal |
//! | [`journal`] | Append-only settlement journal with hash-chained entries |
//! | [`error`] | Typed settlement and configuration errors |
//!
//! # Quick Start
//!
//! ```rust
//! use rwa_settlement::{SettlementCalculator, SettlementConfig};
//!
//! let calc = SettlementCalculator::new(SettlementConfig::default()).unwrap();
//!
//! let primary = calc.compute_primary_purchase(10).unwrap();
//! assert_eq!(primary.base_cost, 1_200_000_000); // 1.2 SOL
//! assert_eq!(primary.fee, 36_000_000);          // 3%
//! assert_eq!(primary.total_buyer_pays, 1_236_000_000);
//!
//! let floor = calc.compute_minimum_resale_price();
//! assert!(calc.validate_listing_price(floor).is_ok());
//! let resale = calc.compute_secondary_purchase(floor, 1).unwrap();
//! assert_eq!(resale.seller_receives, floor - 25_000_000);
//! ```

pub mod breakdown;
pub mod calculator;
pub mod checkout;
pub mod config;
/// Monthly distribution share, calendar-day gate and APY pool math.
pub mod distribution;
pub mod error;
pub mod journal;
/// Typed account layouts and the ledger client boundary.
pub mod ledger;
pub mod records;

pub use breakdown::{Market, SettlementBreakdown};
pub use calculator::SettlementCalculator;
pub use checkout::{
    cancel_listing, claim_distribution, quote, quote_primary, quote_secondary, submit_listing,
    submit_purchase, Receipt,
};
pub use config::SettlementConfig;
pub use distribution::{check_apy_claim, day_of_month_utc, estimate_returns};
pub use error::{ConfigError, ErrorKind, SettlementError};
pub use journal::{JournalEntry, JournalEvent, SettlementJournal};
pub use ledger::{
    InMemoryLedger, Instruction, LayoutError, LedgerClient, LedgerError, Signature,
};
pub use records::{Address, ListingRecord, PurchaseIntent, PurchaseTarget, SaleRecord};

/// FNV-1a hash (crate-internal shared utility).
#[inline(always)]
pub(crate) fn fnv1a(data: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}
