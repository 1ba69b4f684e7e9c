/*
    RWA-Settlement
    Copyright (C) 2026 Moroya Sakamoto
*/

/// Error returned by settlement computations and caller-side record checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    /// Unit count violates the `units >= 1` precondition (or exceeds the
    /// units an asset is divided into).
    #[error("invalid amount: {units} units")]
    InvalidAmount { units: u64 },

    /// Listing price is below the minimum resale price.
    #[error("price too low: {price} lamports per unit, minimum is {minimum}")]
    PriceTooLow { price: u64, minimum: u64 },

    /// Requested more units than the sale has left.
    #[error("sold out: requested {requested} units, {available} available")]
    SoldOut { requested: u64, available: u64 },

    /// The sale is no longer active.
    #[error("sale closed")]
    SaleClosed,

    /// Requested more units than the listing has left.
    #[error("insufficient listing amount: requested {requested} units, {remaining} remaining")]
    InsufficientListingAmount { requested: u64, remaining: u64 },

    /// The listing was filled or cancelled.
    #[error("listing inactive")]
    ListingInactive,

    /// Penalty exceeds the resale subtotal. Only reachable for listings
    /// created below the minimum resale price.
    #[error("negative proceeds: subtotal {subtotal} is below penalty {penalty}")]
    NegativeProceeds { subtotal: u64, penalty: u64 },

    /// Distribution claims are only accepted on the configured day of month.
    #[error("distribution claims open on day {distribution_day}, today is day {today}")]
    WrongDistributionDay { today: u8, distribution_day: u8 },

    /// An APY pool holds less than the returns a claim is owed.
    #[error("insufficient funds: claim needs {required} lamports, pool holds {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// An intermediate or final amount does not fit in 64 bits.
    #[error("arithmetic overflow in settlement calculation")]
    Overflow,
}

/// Coarse classification of a [`SettlementError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller passed a value violating a precondition. Reject locally.
    InputValidation,
    /// Caller's view of a ledger record is stale. Refetch and retry.
    StateConsistency,
    /// A listing slipped past the price floor upstream. Report, never retry.
    ConfigurationInvariant,
}

impl SettlementError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::InvalidAmount { .. }
            | SettlementError::PriceTooLow { .. }
            | SettlementError::WrongDistributionDay { .. }
            | SettlementError::Overflow => ErrorKind::InputValidation,
            SettlementError::SoldOut { .. }
            | SettlementError::SaleClosed
            | SettlementError::InsufficientListingAmount { .. }
            | SettlementError::ListingInactive
            | SettlementError::InsufficientFunds { .. } => ErrorKind::StateConsistency,
            SettlementError::NegativeProceeds { .. } => ErrorKind::ConfigurationInvariant,
        }
    }

    /// True when refetching the ledger record may make the request succeed.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StateConsistency
    }
}

/// Startup configuration failure. Aborts initialization.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("token price must be positive")]
    ZeroTokenPrice,

    #[error("total units per asset must be positive")]
    ZeroTotalUnits,

    /// Sale accounts store unit counts as `u16`.
    #[error("total units per asset {0} exceeds the account limit of 65535")]
    TotalUnitsOutOfRange(u64),

    #[error("{field} of {bps} bps is out of range (max {max})")]
    FeeOutOfRange {
        field: &'static str,
        bps: u16,
        max: u16,
    },

    #[error("distribution day {0} is not a day of month (1-31)")]
    DistributionDayOutOfRange(u8),

    #[error("minimum resale price does not fit in 64 bits")]
    MinimumResaleOverflow,

    #[error("environment variable {name} is not a valid integer: {value:?}")]
    InvalidEnvVar { name: &'static str, value: String },

    #[error("invalid config document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for settlement operations.
pub type Result<T> = std::result::Result<T, SettlementError>;
