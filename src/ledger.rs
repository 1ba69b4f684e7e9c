/*
    RWA-Settlement
    Copyright (C) 2026 Moroya Sakamoto
*/

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::calculator::SettlementCalculator;
use crate::error::SettlementError;
use crate::records::{Address, ListingRecord, SaleRecord};

// ── Account layouts ────────────────────────────────────────────────────

/// Encoded size of a `Sale` account.
pub const SALE_ACCOUNT_LEN: usize = 8 + 32 + 2 + 2 + 1 + 1;
/// Encoded size of a `Listing` account.
pub const LISTING_ACCOUNT_LEN: usize = 8 + 32 + 8 + 2 + 1 + 1;

const SALE_TOTAL: usize = 40;
const SALE_SOLD: usize = 42;
const SALE_ACTIVE: usize = 44;
const LISTING_PRICE: usize = 40;
const LISTING_AMOUNT: usize = 48;
const LISTING_ACTIVE: usize = 50;

const SALE: &str = "Sale";
const LISTING: &str = "Listing";
const DEFAULT_BUMP: u8 = 255;

/// First 8 bytes of `sha256("account:<name>")`.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("account:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Error decoding or encoding raw account data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{account} account too short: expected {expected} bytes, got {actual}")]
    TooShort {
        account: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("discriminator does not identify a {account} account")]
    DiscriminatorMismatch { account: &'static str },

    #[error("invalid bool byte {value} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },

    #[error("sale reports {sold} sold out of {total}")]
    Inconsistent { total: u64, sold: u64 },

    #[error("{field} value {value} does not fit the account layout")]
    FieldOverflow { field: &'static str, value: u64 },
}

/// Decode a `Sale` account.
///
/// Layout: discriminator(8) authority(32) total:u16 sold:u16 active:bool bump:u8.
pub fn decode_sale(data: &[u8]) -> Result<SaleRecord, LayoutError> {
    check_header(data, SALE, SALE_ACCOUNT_LEN)?;
    let total = read_u16(data, SALE_TOTAL) as u64;
    let sold = read_u16(data, SALE_SOLD) as u64;
    if sold > total {
        return Err(LayoutError::Inconsistent { total, sold });
    }
    Ok(SaleRecord {
        authority: read_address(data, 8),
        total_tokens: total,
        tokens_sold: sold,
        active: read_bool(data, SALE_ACTIVE)?,
    })
}

/// Encode a `Sale` account. Inverse of [`decode_sale`].
pub fn encode_sale(sale: &SaleRecord, bump: u8) -> Result<Vec<u8>, LayoutError> {
    let total = narrow_u16("total_tokens", sale.total_tokens)?;
    let sold = narrow_u16("tokens_sold", sale.tokens_sold)?;
    let mut data = Vec::with_capacity(SALE_ACCOUNT_LEN);
    data.extend_from_slice(&account_discriminator(SALE));
    data.extend_from_slice(sale.authority.as_bytes());
    data.extend_from_slice(&total.to_le_bytes());
    data.extend_from_slice(&sold.to_le_bytes());
    data.push(sale.active as u8);
    data.push(bump);
    Ok(data)
}

/// Decode a `Listing` account.
///
/// Layout: discriminator(8) seller(32) price:u64 amount:u16 active:bool bump:u8.
pub fn decode_listing(data: &[u8]) -> Result<ListingRecord, LayoutError> {
    check_header(data, LISTING, LISTING_ACCOUNT_LEN)?;
    Ok(ListingRecord {
        seller: read_address(data, 8),
        price_lamports_per_unit: read_u64(data, LISTING_PRICE),
        amount_remaining: read_u16(data, LISTING_AMOUNT) as u64,
        active: read_bool(data, LISTING_ACTIVE)?,
    })
}

/// Encode a `Listing` account. Inverse of [`decode_listing`].
pub fn encode_listing(listing: &ListingRecord, bump: u8) -> Result<Vec<u8>, LayoutError> {
    let amount = narrow_u16("amount_remaining", listing.amount_remaining)?;
    let mut data = Vec::with_capacity(LISTING_ACCOUNT_LEN);
    data.extend_from_slice(&account_discriminator(LISTING));
    data.extend_from_slice(listing.seller.as_bytes());
    data.extend_from_slice(&listing.price_lamports_per_unit.to_le_bytes());
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(listing.active as u8);
    data.push(bump);
    Ok(data)
}

/// Write a sale's mutable fields (`sold`, `active`) into existing account
/// data. The bump and any trailing bytes are left untouched.
fn patch_sale(data: &mut [u8], sale: &SaleRecord) -> Result<(), LayoutError> {
    check_header(data, SALE, SALE_ACCOUNT_LEN)?;
    let sold = narrow_u16("tokens_sold", sale.tokens_sold)?;
    data[SALE_SOLD..SALE_SOLD + 2].copy_from_slice(&sold.to_le_bytes());
    data[SALE_ACTIVE] = sale.active as u8;
    Ok(())
}

/// Write a listing's mutable fields (`amount`, `active`) into existing
/// account data.
fn patch_listing(data: &mut [u8], listing: &ListingRecord) -> Result<(), LayoutError> {
    check_header(data, LISTING, LISTING_ACCOUNT_LEN)?;
    let amount = narrow_u16("amount_remaining", listing.amount_remaining)?;
    data[LISTING_AMOUNT..LISTING_AMOUNT + 2].copy_from_slice(&amount.to_le_bytes());
    data[LISTING_ACTIVE] = listing.active as u8;
    Ok(())
}

fn check_header(data: &[u8], account: &'static str, expected: usize) -> Result<(), LayoutError> {
    if data.len() < expected {
        return Err(LayoutError::TooShort {
            account,
            expected,
            actual: data.len(),
        });
    }
    if data[..8] != account_discriminator(account) {
        return Err(LayoutError::DiscriminatorMismatch { account });
    }
    Ok(())
}

#[inline]
fn read_address(data: &[u8], offset: usize) -> Address {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[offset..offset + 32]);
    Address(bytes)
}

#[inline]
fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

#[inline]
fn read_bool(data: &[u8], offset: usize) -> Result<bool, LayoutError> {
    match data[offset] {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(LayoutError::InvalidBool { offset, value }),
    }
}

#[inline]
fn narrow_u16(field: &'static str, value: u64) -> Result<u16, LayoutError> {
    u16::try_from(value).map_err(|_| LayoutError::FieldOverflow { field, value })
}

// ── Ledger client ──────────────────────────────────────────────────────

/// Confirmation handle for a submitted instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Signature(pub u64);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Instructions a client submits to the settlement programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    BuyPrimary {
        sale: Address,
        units: u64,
    },
    CreateListing {
        listing: Address,
        seller: Address,
        price_per_unit: u64,
        units: u64,
    },
    BuySecondary {
        listing: Address,
        units: u64,
    },
    CancelListing {
        listing: Address,
        seller: Address,
    },
}

/// Error returned by a ledger client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    AccountNotFound(Address),

    #[error("account already exists: {0}")]
    AccountExists(Address),

    #[error("{0} is not the listing seller")]
    Unauthorized(Address),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

/// Read and write access to the settlement ledger.
///
/// Implementations decode raw account data into typed records; the
/// calculator never sees bytes.
pub trait LedgerClient {
    /// Fetch the current state of a primary sale.
    fn fetch_sale(&self, address: &Address) -> Result<SaleRecord, LedgerError>;

    /// Fetch the current state of a secondary listing.
    fn fetch_listing(&self, address: &Address) -> Result<ListingRecord, LedgerError>;

    /// Submit an instruction and wait for confirmation.
    fn submit(&mut self, instruction: &Instruction) -> Result<Signature, LedgerError>;
}

// ── In-memory ledger ───────────────────────────────────────────────────

/// Ledger held in memory that enforces the settlement programs' rules.
///
/// Accounts are stored as raw bytes and decoded on every access. Credits to
/// sellers, sale authorities and the platform are tracked so tests can
/// compare what settled against what was projected.
pub struct InMemoryLedger {
    calculator: SettlementCalculator,
    accounts: HashMap<Address, Vec<u8>>,
    credits: HashMap<Address, u64>,
    platform_collected: u64,
    next_signature: u64,
}

impl InMemoryLedger {
    /// Create an empty ledger enforcing `calculator`'s constants.
    pub fn new(calculator: SettlementCalculator) -> Self {
        Self {
            calculator,
            accounts: HashMap::new(),
            credits: HashMap::new(),
            platform_collected: 0,
            next_signature: 1,
        }
    }

    /// Open a primary sale of one asset's worth of units.
    pub fn init_sale(&mut self, sale: Address, authority: Address) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&sale) {
            return Err(LedgerError::AccountExists(sale));
        }
        let record = SaleRecord {
            authority,
            total_tokens: self.calculator.config().total_units_per_asset,
            tokens_sold: 0,
            active: true,
        };
        self.accounts.insert(sale, encode_sale(&record, DEFAULT_BUMP)?);
        Ok(())
    }

    /// Close a sale before it sells out. Only the sale authority may close it.
    pub fn close_sale(&mut self, sale: Address, authority: Address) -> Result<(), LedgerError> {
        let mut record = self.fetch_sale(&sale)?;
        if record.authority != authority {
            return Err(LedgerError::Unauthorized(authority));
        }
        record.active = false;
        self.store_sale(sale, &record)
    }

    /// Replace an account's raw data.
    pub fn insert_raw(&mut self, address: Address, data: Vec<u8>) {
        self.accounts.insert(address, data);
    }

    /// Raw data of an account, if present.
    pub fn raw_account(&self, address: &Address) -> Option<&[u8]> {
        self.accounts.get(address).map(Vec::as_slice)
    }

    /// Total lamports credited to `address` by settled purchases.
    pub fn credited(&self, address: &Address) -> u64 {
        self.credits.get(address).copied().unwrap_or(0)
    }

    /// Total fees and penalties credited to the platform.
    #[inline]
    pub fn platform_collected(&self) -> u64 {
        self.platform_collected
    }

    fn raw(&self, address: &Address) -> Result<&[u8], LedgerError> {
        self.raw_account(address)
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    fn store_sale(&mut self, address: Address, record: &SaleRecord) -> Result<(), LedgerError> {
        let data = self
            .accounts
            .get_mut(&address)
            .ok_or(LedgerError::AccountNotFound(address))?;
        patch_sale(data, record)?;
        Ok(())
    }

    fn store_listing(
        &mut self,
        address: Address,
        record: &ListingRecord,
    ) -> Result<(), LedgerError> {
        let data = self
            .accounts
            .get_mut(&address)
            .ok_or(LedgerError::AccountNotFound(address))?;
        patch_listing(data, record)?;
        Ok(())
    }

    fn credit(&mut self, address: Address, seller_amount: u64, platform_amount: u64) {
        let entry = self.credits.entry(address).or_insert(0);
        *entry = entry.saturating_add(seller_amount);
        self.platform_collected = self.platform_collected.saturating_add(platform_amount);
    }

    fn issue_signature(&mut self) -> Signature {
        let sig = Signature(self.next_signature);
        self.next_signature += 1;
        sig
    }

    fn buy_primary(&mut self, sale: Address, units: u64) -> Result<(), LedgerError> {
        let mut record = self.fetch_sale(&sale)?;
        record.check_purchase(units)?;
        let breakdown = self.calculator.compute_primary_purchase(units)?;

        record.tokens_sold += units;
        if record.tokens_sold >= record.total_tokens {
            record.active = false;
        }
        // Store before crediting so a layout failure leaves nothing half-applied.
        self.store_sale(sale, &record)?;
        self.credit(
            record.authority,
            breakdown.seller_receives,
            breakdown.platform_receives,
        );
        Ok(())
    }

    fn create_listing(
        &mut self,
        listing: Address,
        seller: Address,
        price_per_unit: u64,
        units: u64,
    ) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&listing) {
            return Err(LedgerError::AccountExists(listing));
        }
        self.calculator.validate_listing_price(price_per_unit)?;
        if units == 0 {
            return Err(SettlementError::InvalidAmount { units }.into());
        }
        let record = ListingRecord {
            seller,
            price_lamports_per_unit: price_per_unit,
            amount_remaining: units,
            active: true,
        };
        self.accounts
            .insert(listing, encode_listing(&record, DEFAULT_BUMP)?);
        Ok(())
    }

    fn buy_secondary(&mut self, listing: Address, units: u64) -> Result<(), LedgerError> {
        let mut record = self.fetch_listing(&listing)?;
        record.check_purchase(units)?;
        let breakdown = self
            .calculator
            .compute_secondary_purchase(record.price_lamports_per_unit, units)?;

        record.amount_remaining -= units;
        if record.amount_remaining == 0 {
            record.active = false;
        }
        self.store_listing(listing, &record)?;
        self.credit(
            record.seller,
            breakdown.seller_receives,
            breakdown.platform_receives,
        );
        Ok(())
    }

    fn cancel_listing(&mut self, listing: Address, seller: Address) -> Result<(), LedgerError> {
        let mut record = self.fetch_listing(&listing)?;
        if record.seller != seller {
            return Err(LedgerError::Unauthorized(seller));
        }
        if !record.active {
            return Err(SettlementError::ListingInactive.into());
        }
        record.active = false;
        self.store_listing(listing, &record)
    }
}

impl LedgerClient for InMemoryLedger {
    fn fetch_sale(&self, address: &Address) -> Result<SaleRecord, LedgerError> {
        Ok(decode_sale(self.raw(address)?)?)
    }

    fn fetch_listing(&self, address: &Address) -> Result<ListingRecord, LedgerError> {
        Ok(decode_listing(self.raw(address)?)?)
    }

    fn submit(&mut self, instruction: &Instruction) -> Result<Signature, LedgerError> {
        match *instruction {
            Instruction::BuyPrimary { sale, units } => self.buy_primary(sale, units)?,
            Instruction::CreateListing {
                listing,
                seller,
                price_per_unit,
                units,
            } => self.create_listing(listing, seller, price_per_unit, units)?,
            Instruction::BuySecondary { listing, units } => self.buy_secondary(listing, units)?,
            Instruction::CancelListing { listing, seller } => {
                self.cancel_listing(listing, seller)?
            }
        }
        Ok(self.issue_signature())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
