//! In-memory balance map implementing [`ValueTransfer`].
//!
//! Tracks one balance per party. All mutations are atomic: either the full
//! operation succeeds or the balance is unchanged. Used by tests and by
//! embedders that settle on a ledger they mirror in memory.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use rust_decimal::Decimal;
use swapledger_types::{PartyId, Result, SwapError};

use crate::value_transfer::ValueTransfer;

#[derive(Default)]
struct Accounts {
    balances: HashMap<PartyId, Decimal>,
    /// Parties whose debits are refused.
    revoked: HashSet<PartyId>,
}

/// Thread-safe per-party balances.
#[derive(Default)]
pub struct InMemoryBalances {
    accounts: Mutex<Accounts>,
}

impl InMemoryBalances {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit funds (increases the party's balance).
    ///
    /// # Panics
    /// If the party's balance overflows.
    pub fn deposit(&self, party: &PartyId, amount: Decimal) {
        *self
            .accounts
            .lock()
            .balances
            .entry(party.clone())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Refuse all further debits from `party` until [`Self::restore`].
    pub fn revoke(&self, party: &PartyId) {
        self.accounts.lock().revoked.insert(party.clone());
    }

    pub fn restore(&self, party: &PartyId) {
        self.accounts.lock().revoked.remove(party);
    }

    #[must_use]
    pub fn balance(&self, party: &PartyId) -> Decimal {
        self.accounts
            .lock()
            .balances
            .get(party)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of all parties' balances.
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.accounts
            .lock()
            .balances
            .values()
            .copied()
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

fn check_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(SwapError::TransferFailed(format!(
            "negative transfer amount {amount}"
        )));
    }
    Ok(())
}

impl ValueTransfer for InMemoryBalances {
    fn debit(&self, party: &PartyId, amount: Decimal) -> Result<()> {
        check_amount(amount)?;
        let mut accounts = self.accounts.lock();
        if accounts.revoked.contains(party) {
            return Err(SwapError::InsufficientAuthorization(party.clone()));
        }

        let available = accounts.balances.get(party).copied().unwrap_or(Decimal::ZERO);
        if available < amount {
            return Err(SwapError::InsufficientFunds {
                party: party.clone(),
                needed: amount,
                available,
            });
        }

        accounts.balances.insert(party.clone(), available - amount);
        Ok(())
    }

    fn credit(&self, party: &PartyId, amount: Decimal) -> Result<()> {
        check_amount(amount)?;
        let mut accounts = self.accounts.lock();
        let balance = accounts.balances.entry(party.clone()).or_insert(Decimal::ZERO);
        *balance = balance.checked_add(amount).ok_or_else(|| {
            SwapError::TransferFailed(format!("balance of {party} would overflow"))
        })?;
        Ok(())
    }
}
