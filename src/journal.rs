/*
    RWA-Settlement
    Copyright (C) 2026 Moroya Sakamoto
*/

use crate::breakdown::Market;
use crate::fnv1a;
use crate::ledger::Signature;
use crate::records::Address;

/// A settlement journal entry for audit purposes.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// Sequential entry number.
    pub sequence: u64,
    /// Timestamp of the journal entry.
    pub timestamp_ns: u64,
    /// Type of event.
    pub event: JournalEvent,
}

/// Events that can be recorded in the settlement journal.
#[derive(Debug, Clone)]
pub enum JournalEvent {
    PurchaseSubmitted {
        market: Market,
        target: Address,
        units: u64,
        total_buyer_pays: u64,
        signature: Signature,
    },
    ListingCreated {
        listing: Address,
        price_per_unit: u64,
        units: u64,
        signature: Signature,
    },
    ListingCancelled {
        listing: Address,
        signature: Signature,
    },
    DistributionClaimed {
        claimant: Address,
        units_held: u64,
        amount: u64,
    },
    SubmissionRejected {
        target: Address,
        reason: String,
    },
}

impl JournalEvent {
    /// Discriminant byte used in step hashes.
    fn kind_byte(&self) -> u8 {
        match self {
            JournalEvent::PurchaseSubmitted { .. } => 0,
            JournalEvent::ListingCreated { .. } => 1,
            JournalEvent::ListingCancelled { .. } => 2,
            JournalEvent::DistributionClaimed { .. } => 3,
            JournalEvent::SubmissionRejected { .. } => 4,
        }
    }

    /// Fold the event's fields into a single hashable word.
    fn payload(&self) -> u64 {
        match self {
            JournalEvent::PurchaseSubmitted {
                market,
                target,
                units,
                total_buyer_pays,
                signature,
            } => {
                fnv1a(target.as_bytes())
                    ^ (*market as u64)
                    ^ units.rotate_left(8)
                    ^ total_buyer_pays.rotate_left(24)
                    ^ signature.0.rotate_left(48)
            }
            JournalEvent::ListingCreated {
                listing,
                price_per_unit,
                units,
                signature,
            } => {
                fnv1a(listing.as_bytes())
                    ^ price_per_unit.rotate_left(16)
                    ^ units.rotate_left(32)
                    ^ signature.0.rotate_left(48)
            }
            JournalEvent::ListingCancelled { listing, signature } => {
                fnv1a(listing.as_bytes()) ^ signature.0.rotate_left(48)
            }
            JournalEvent::DistributionClaimed {
                claimant,
                units_held,
                amount,
            } => fnv1a(claimant.as_bytes()) ^ units_held.rotate_left(32) ^ *amount,
            JournalEvent::SubmissionRejected { target, reason } => {
                fnv1a(target.as_bytes()) ^ fnv1a(reason.as_bytes())
            }
        }
    }
}

/// Append-only settlement journal for audit trail.
///
/// Sequence numbers start at 1 and increment monotonically with each recorded
/// event. The journal never removes entries.
pub struct SettlementJournal {
    entries: Vec<JournalEntry>,
    next_seq: u64,
}

impl SettlementJournal {
    /// Create a new, empty journal. The first recorded entry will have sequence 1.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 1,
        }
    }

    /// Append an event to the journal.
    pub fn record(&mut self, timestamp_ns: u64, event: JournalEvent) {
        let sequence = self.next_seq;
        self.next_seq += 1;
        self.entries.push(JournalEntry {
            sequence,
            timestamp_ns,
            event,
        });
    }

    /// Return a slice of all journal entries in order.
    #[inline(always)]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Return the number of entries in the journal.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true when the journal contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a reference to the most recent entry, or `None` if the journal
    /// is empty.
    #[inline(always)]
    pub fn last_entry(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    /// Cumulative fingerprint of every entry, chained in order.
    ///
    /// Two journals with the same events, timestamps and order produce the
    /// same hash; any edit, insertion or reordering changes it.
    pub fn chain_hash(&self) -> u64 {
        let mut cumulative: u64 = 0xcbf29ce484222325; // FNV offset basis
        for entry in &self.entries {
            let step = step_hash(
                entry.sequence,
                entry.timestamp_ns,
                entry.event.kind_byte(),
                entry.event.payload(),
            );
            let mut data = [0u8; 16];
            data[0..8].copy_from_slice(&cumulative.to_le_bytes());
            data[8..16].copy_from_slice(&step.to_le_bytes());
            cumulative = fnv1a(&data);
        }
        cumulative
    }
}

impl Default for SettlementJournal {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

fn step_hash(sequence: u64, timestamp_ns: u64, kind: u8, payload: u64) -> u64 {
    let mut data = [0u8; 25];
    data[0..8].copy_from_slice(&sequence.to_le_bytes());
    data[8..16].copy_from_slice(&timestamp_ns.to_le_bytes());
    data[16] = kind;
    data[17..25].copy_from_slice(&payload.to_le_bytes());
    fnv1a(&data)
}
