//! Events emitted by the Settlement Ledger on every successful transition.
//!
//! Watchers (relayers, the coordinator's own bookkeeping, tests) consume
//! these instead of reading a chain's log.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PartyId, SwapId, SwapRecord};

/// Which transition an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapEventKind {
    Locked,
    Unlocked,
    Aborted,
}

impl std::fmt::Display for SwapEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "Locked"),
            Self::Unlocked => write!(f, "Unlocked"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

/// A single ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SwapEvent {
    Locked {
        swap_id: SwapId,
        proposer: PartyId,
        acceptor: PartyId,
        principal_amount: Decimal,
        security_amount: Decimal,
    },
    Unlocked {
        swap_id: SwapId,
        proposer: PartyId,
        acceptor: PartyId,
        principal_amount: Decimal,
    },
    Aborted {
        swap_id: SwapId,
        proposer: PartyId,
        acceptor: PartyId,
        principal_amount: Decimal,
    },
}

impl SwapEvent {
    #[must_use]
    pub fn locked(record: &SwapRecord) -> Self {
        Self::Locked {
            swap_id: record.swap_id.clone(),
            proposer: record.proposer.clone(),
            acceptor: record.acceptor.clone(),
            principal_amount: record.principal_amount,
            security_amount: record.security_amount,
        }
    }

    #[must_use]
    pub fn unlocked(record: &SwapRecord) -> Self {
        Self::Unlocked {
            swap_id: record.swap_id.clone(),
            proposer: record.proposer.clone(),
            acceptor: record.acceptor.clone(),
            principal_amount: record.principal_amount,
        }
    }

    #[must_use]
    pub fn aborted(record: &SwapRecord) -> Self {
        Self::Aborted {
            swap_id: record.swap_id.clone(),
            proposer: record.proposer.clone(),
            acceptor: record.acceptor.clone(),
            principal_amount: record.principal_amount,
        }
    }

    #[must_use]
    pub fn kind(&self) -> SwapEventKind {
        match self {
            Self::Locked { .. } => SwapEventKind::Locked,
            Self::Unlocked { .. } => SwapEventKind::Unlocked,
            Self::Aborted { .. } => SwapEventKind::Aborted,
        }
    }

    #[must_use]
    pub fn swap_id(&self) -> &SwapId {
        match self {
            Self::Locked { swap_id, .. }
            | Self::Unlocked { swap_id, .. }
            | Self::Aborted { swap_id, .. } => swap_id,
        }
    }
}
