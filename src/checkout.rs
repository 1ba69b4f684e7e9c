// RWA-Settlement — Fetch, check, compute, submit
// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Moroya Sakamoto

use serde::Serialize;

use crate::breakdown::{Market, SettlementBreakdown};
use crate::calculator::SettlementCalculator;
use crate::error::SettlementError;
use crate::journal::{JournalEvent, SettlementJournal};
use crate::ledger::{Instruction, LedgerClient, LedgerError, Signature};
use crate::records::{Address, PurchaseIntent, PurchaseTarget};

// ── Types ──────────────────────────────────────────────────────────────

/// Confirmed purchase together with the breakdown it was submitted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub signature: Signature,
    pub breakdown: SettlementBreakdown,
}

// ── Quoting ────────────────────────────────────────────────────────────

/// Project a primary purchase against the sale's current state.
pub fn quote_primary<L: LedgerClient + ?Sized>(
    ledger: &L,
    calculator: &SettlementCalculator,
    sale: &Address,
    units: u64,
) -> Result<SettlementBreakdown, LedgerError> {
    let record = ledger.fetch_sale(sale)?;
    record.check_purchase(units)?;
    Ok(calculator.compute_primary_purchase(units)?)
}

/// Project a secondary purchase against the listing's current state.
pub fn quote_secondary<L: LedgerClient + ?Sized>(
    ledger: &L,
    calculator: &SettlementCalculator,
    listing: &Address,
    units: u64,
) -> Result<SettlementBreakdown, LedgerError> {
    let record = ledger.fetch_listing(listing)?;
    record.check_purchase(units)?;
    Ok(calculator.compute_secondary_purchase(record.price_lamports_per_unit, units)?)
}

/// Project whichever purchase `intent` describes.
pub fn quote<L: LedgerClient + ?Sized>(
    ledger: &L,
    calculator: &SettlementCalculator,
    intent: &PurchaseIntent,
) -> Result<SettlementBreakdown, LedgerError> {
    match intent.target {
        PurchaseTarget::Sale(sale) => quote_primary(ledger, calculator, &sale, intent.units),
        PurchaseTarget::Listing(listing) => {
            quote_secondary(ledger, calculator, &listing, intent.units)
        }
    }
}

// ── Submission ─────────────────────────────────────────────────────────

/// Re-quote `intent` from fresh ledger state and submit it.
///
/// Requests that fail client-side checks never reach the ledger. Every
/// outcome, accepted or rejected, is journaled.
pub fn submit_purchase<L: LedgerClient + ?Sized>(
    ledger: &mut L,
    calculator: &SettlementCalculator,
    journal: &mut SettlementJournal,
    intent: &PurchaseIntent,
    timestamp_ns: u64,
) -> Result<Receipt, LedgerError> {
    let (market, target) = match intent.target {
        PurchaseTarget::Sale(sale) => (Market::Primary, sale),
        PurchaseTarget::Listing(listing) => (Market::Secondary, listing),
    };

    let outcome = quote(&*ledger, calculator, intent).and_then(|breakdown| {
        let instruction = match market {
            Market::Primary => Instruction::BuyPrimary {
                sale: target,
                units: intent.units,
            },
            Market::Secondary => Instruction::BuySecondary {
                listing: target,
                units: intent.units,
            },
        };
        let signature = ledger.submit(&instruction)?;
        Ok(Receipt {
            signature,
            breakdown,
        })
    });

    match &outcome {
        Ok(receipt) => journal.record(
            timestamp_ns,
            JournalEvent::PurchaseSubmitted {
                market,
                target,
                units: intent.units,
                total_buyer_pays: receipt.breakdown.total_buyer_pays,
                signature: receipt.signature,
            },
        ),
        Err(err) => record_rejection(journal, timestamp_ns, target, err),
    }
    outcome
}

/// Validate the asking price and create a listing.
#[allow(clippy::too_many_arguments)]
pub fn submit_listing<L: LedgerClient + ?Sized>(
    ledger: &mut L,
    calculator: &SettlementCalculator,
    journal: &mut SettlementJournal,
    listing: Address,
    seller: Address,
    price_per_unit: u64,
    units: u64,
    timestamp_ns: u64,
) -> Result<Signature, LedgerError> {
    let outcome = check_listing(calculator, price_per_unit, units).and_then(|()| {
        ledger.submit(&Instruction::CreateListing {
            listing,
            seller,
            price_per_unit,
            units,
        })
    });

    match &outcome {
        Ok(signature) => journal.record(
            timestamp_ns,
            JournalEvent::ListingCreated {
                listing,
                price_per_unit,
                units,
                signature: *signature,
            },
        ),
        Err(err) => record_rejection(journal, timestamp_ns, listing, err),
    }
    outcome
}

/// Cancel an active listing on behalf of its seller.
pub fn cancel_listing<L: LedgerClient + ?Sized>(
    ledger: &mut L,
    journal: &mut SettlementJournal,
    listing: Address,
    seller: Address,
    timestamp_ns: u64,
) -> Result<Signature, LedgerError> {
    let outcome = ledger
        .fetch_listing(&listing)
        .and_then(|record| {
            if record.active {
                Ok(())
            } else {
                Err(SettlementError::ListingInactive.into())
            }
        })
        .and_then(|()| ledger.submit(&Instruction::CancelListing { listing, seller }));

    match &outcome {
        Ok(signature) => journal.record(
            timestamp_ns,
            JournalEvent::ListingCancelled {
                listing,
                signature: *signature,
            },
        ),
        Err(err) => record_rejection(journal, timestamp_ns, listing, err),
    }
    outcome
}

/// Gate and compute a monthly distribution claim for `claimant`, journaling
/// the payout or the rejection.
#[allow(clippy::too_many_arguments)]
pub fn claim_distribution(
    calculator: &SettlementCalculator,
    journal: &mut SettlementJournal,
    claimant: Address,
    today_day_of_month: u8,
    pool_balance: u64,
    units_held: u64,
    timestamp_ns: u64,
) -> Result<u64, SettlementError> {
    let outcome = calculator.claim_distribution(today_day_of_month, pool_balance, units_held);
    match &outcome {
        Ok(amount) => journal.record(
            timestamp_ns,
            JournalEvent::DistributionClaimed {
                claimant,
                units_held,
                amount: *amount,
            },
        ),
        Err(err) => record_rejection(journal, timestamp_ns, claimant, err),
    }
    outcome
}

fn check_listing(
    calculator: &SettlementCalculator,
    price_per_unit: u64,
    units: u64,
) -> Result<(), LedgerError> {
    calculator.validate_listing_price(price_per_unit)?;
    if units == 0 {
        return Err(SettlementError::InvalidAmount { units }.into());
    }
    Ok(())
}

fn record_rejection(
    journal: &mut SettlementJournal,
    timestamp_ns: u64,
    target: Address,
    err: &impl std::fmt::Display,
) {
    journal.record(
        timestamp_ns,
        JournalEvent::SubmissionRejected {
            target,
            reason: err.to_string(),
        },
    );
}

// ── Tests ──────────────────────────────────────────────────────────────
