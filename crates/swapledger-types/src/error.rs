//! Error types for the SwapLedger escrow state machine.
//!
//! Every variant carries a stable `SL_ERR_` code (see [`SwapError::code`])
//! for easy grepping in logs. Codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Value errors
//! - 3xx: Swap lifecycle errors
//! - 4xx: Value transfer errors
//! - 9xx: General / internal errors
//!
//! The display strings of the four caller-facing rejections (wrong lock
//! caller, wrong funding, wrong resolver, unknown id) must stay byte-for-byte
//! identical to the settlement contract's revert reasons. The code is never
//! part of the message.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{PartyId, SwapId, SwapStatus};

/// Coarse classification of a [`SwapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    ValueMismatch,
    InvalidAmount,
    DuplicateSwap,
    NotFound,
    InvalidState,
    RecordMismatch,
    Transfer,
    Invariant,
    Configuration,
}

/// Central error enum for all SwapLedger operations.
#[derive(Debug, Error)]
pub enum SwapError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// `lock` was called by someone other than the declared proposer.
    #[error("msg.sender is not _transferFromAddress")]
    NotProposer { caller: PartyId, proposer: PartyId },

    /// `unlock` / `abort` was called by someone other than the coordinator.
    #[error("msg.sender is not contract owner")]
    NotCoordinator { caller: PartyId },

    // =================================================================
    // Value Errors (2xx)
    // =================================================================
    /// The attached funding does not equal the declared principal.
    #[error("msg.value is not equivalent to _weiAmount")]
    ValueMismatch { funded: Decimal, principal: Decimal },

    /// Principal must be positive and the security deposit non-negative.
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    // =================================================================
    // Swap Lifecycle Errors (3xx)
    // =================================================================
    /// A record for this id already exists.
    #[error("swap already exists: {0}")]
    DuplicateSwap(SwapId),

    /// No record exists for this id.
    #[error("The swapId does not exist")]
    SwapNotFound(SwapId),

    /// The record is no longer `Locked`.
    #[error("swap {swap_id} is {status}, not LOCKED")]
    InvalidState { swap_id: SwapId, status: SwapStatus },

    /// The resolution request disagrees with the stored record.
    #[error("swap {swap_id} does not match request: {field} differs")]
    RecordMismatch {
        swap_id: SwapId,
        field: &'static str,
    },

    /// An earlier payout for this swap could not be reversed.
    #[error("swap {0} is quarantined after a failed payout reversal")]
    SwapQuarantined(SwapId),

    // =================================================================
    // Value Transfer Errors (4xx)
    // =================================================================
    /// The debited party does not hold enough value.
    #[error("insufficient funds for {party}: need {needed}, have {available}")]
    InsufficientFunds {
        party: PartyId,
        needed: Decimal,
        available: Decimal,
    },

    /// The value transfer backend refused to move this party's funds.
    #[error("insufficient authorization to debit {0}")]
    InsufficientAuthorization(PartyId),

    /// Any other failure reported by the value transfer backend.
    #[error("value transfer failed: {0}")]
    TransferFailed(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Escrow custody no longer matches recorded inflows and outflows.
    #[error("custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    /// A payout failed and reversing the payouts already made also failed.
    /// The swap is quarantined.
    #[error("payout for swap {swap_id} failed ({cause}) and could not be reversed ({reversal})")]
    PayoutReversalFailed {
        swap_id: SwapId,
        cause: String,
        reversal: String,
    },

    /// Configuration error (invalid config document, missing fields, etc.).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SwapError {
    /// Stable log code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotProposer { .. } => "SL_ERR_100",
            Self::NotCoordinator { .. } => "SL_ERR_101",
            Self::ValueMismatch { .. } => "SL_ERR_200",
            Self::InvalidAmount { .. } => "SL_ERR_201",
            Self::DuplicateSwap(_) => "SL_ERR_300",
            Self::SwapNotFound(_) => "SL_ERR_301",
            Self::InvalidState { .. } => "SL_ERR_302",
            Self::RecordMismatch { .. } => "SL_ERR_303",
            Self::SwapQuarantined(_) => "SL_ERR_304",
            Self::InsufficientFunds { .. } => "SL_ERR_400",
            Self::InsufficientAuthorization(_) => "SL_ERR_401",
            Self::TransferFailed(_) => "SL_ERR_402",
            Self::CustodyInvariantViolation { .. } => "SL_ERR_900",
            Self::Configuration(_) => "SL_ERR_901",
            Self::PayoutReversalFailed { .. } => "SL_ERR_902",
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotProposer { .. } | Self::NotCoordinator { .. } => ErrorKind::Unauthorized,
            Self::ValueMismatch { .. } => ErrorKind::ValueMismatch,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::DuplicateSwap(_) => ErrorKind::DuplicateSwap,
            Self::SwapNotFound(_) => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::RecordMismatch { .. } => ErrorKind::RecordMismatch,
            Self::InsufficientFunds { .. }
            | Self::InsufficientAuthorization(_)
            | Self::TransferFailed(_) => ErrorKind::Transfer,
            Self::SwapQuarantined(_)
            | Self::CustodyInvariantViolation { .. }
            | Self::PayoutReversalFailed { .. } => ErrorKind::Invariant,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapError>;

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
