//! The Value Transfer collaborator.
//!
//! The ledger never holds balances itself; it asks a [`ValueTransfer`]
//! backend to move value into escrow (`debit`) and out of escrow
//! (`credit`). Each call is atomic from the ledger's point of view: it
//! either moves the full amount or fails without effect.
//!
//! The ledger calls the backend while it holds the lock for the swap being
//! transitioned. Backends must not call back into the ledger.

use std::sync::Arc;

use rust_decimal::Decimal;
use swapledger_types::{PartyId, Result};

/// Funds custody backend used by the Settlement Ledger.
pub trait ValueTransfer: Send + Sync {
    /// Take `amount` from `party` into escrow.
    ///
    /// # Errors
    /// `InsufficientFunds` if the party cannot cover `amount`,
    /// `InsufficientAuthorization` if the backend refuses to move the party's
    /// funds, `TransferFailed` for anything else.
    fn debit(&self, party: &PartyId, amount: Decimal) -> Result<()>;

    /// Release `amount` from escrow to `party`.
    fn credit(&self, party: &PartyId, amount: Decimal) -> Result<()>;
}

impl<T: ValueTransfer + ?Sized> ValueTransfer for Arc<T> {
    fn debit(&self, party: &PartyId, amount: Decimal) -> Result<()> {
        (**self).debit(party, amount)
    }

    fn credit(&self, party: &PartyId, amount: Decimal) -> Result<()> {
        (**self).credit(party, amount)
    }
}
