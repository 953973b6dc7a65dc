//! Payouts: the value a resolution moves out of escrow.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PartyId, SwapRecord};

/// Why a payout is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutReason {
    /// Principal released to the acceptor on unlock.
    Principal,
    /// Principal returned to the proposer on abort.
    Refund,
    /// Security deposit leaving escrow.
    Security,
}

/// One credit out of escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: PartyId,
    pub amount: Decimal,
    pub reason: PayoutReason,
}

impl Payout {
    #[must_use]
    pub fn new(recipient: PartyId, amount: Decimal, reason: PayoutReason) -> Self {
        Self {
            recipient,
            amount,
            reason,
        }
    }
}

/// Outcome of a successful `unlock` / `abort`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The record after the transition.
    pub record: SwapRecord,
    /// Credits made, in the order they were applied. Zero amounts are omitted.
    pub payouts: Vec<Payout>,
}

impl Resolution {
    /// Sum of all payouts. Equals the record's escrowed value.
    #[must_use]
    pub fn total_paid(&self) -> Decimal {
        self.payouts.iter().map(|p| p.amount).sum()
    }

    /// Total credited to `party` by this resolution.
    #[must_use]
    pub fn paid_to(&self, party: &PartyId) -> Decimal {
        self.payouts
            .iter()
            .filter(|p| &p.recipient == party)
            .map(|p| p.amount)
            .sum()
    }
}
