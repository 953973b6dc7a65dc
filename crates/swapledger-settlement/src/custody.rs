//! Escrow custody invariant checker.
//!
//! Invariant enforced by every ledger transition:
//! ```text
//! Σ escrowed_value(locked records) == Σ(lock inflows) - Σ(resolution outflows)
//! ```
//!
//! Funds only move between parties and escrow; if this ever breaks, value was
//! created or destroyed inside the ledger. A quarantined swap (a payout that
//! could not be reversed) also fails verification: part of its value has
//! left escrow without a resolution.

use rust_decimal::Decimal;
use swapledger_types::{Result, SwapError};

/// Running totals of value moved into and out of escrow.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CustodyAudit {
    inflow: Decimal,
    outflow: Decimal,
    locks: u64,
    resolutions: u64,
    quarantined: u64,
}

impl CustodyAudit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record value taken into escrow by a lock.
    ///
    /// # Errors
    /// Returns [`SwapError::InvalidAmount`] if total inflow would overflow.
    /// The audit is unchanged in that case.
    pub(crate) fn record_lock(&mut self, amount: Decimal) -> Result<()> {
        self.inflow = self
            .inflow
            .checked_add(amount)
            .ok_or_else(|| SwapError::InvalidAmount {
                reason: format!(
                    "escrow inflow {} plus {amount} exceeds the custody limit",
                    self.inflow
                ),
            })?;
        self.locks += 1;
        Ok(())
    }

    /// Undo a [`Self::record_lock`] whose debit failed.
    pub(crate) fn revert_lock(&mut self, amount: Decimal) {
        self.inflow -= amount;
        self.locks -= 1;
    }

    /// Record value paid out of escrow by an unlock or abort.
    ///
    /// Outflow is bounded by inflow, so it cannot overflow.
    pub(crate) fn record_resolution(&mut self, amount: Decimal) {
        self.outflow += amount;
        self.resolutions += 1;
    }

    /// Record a swap whose payout could not be reversed.
    pub(crate) fn record_quarantine(&mut self) {
        self.quarantined += 1;
    }

    /// Value that should currently be in custody.
    #[must_use]
    pub fn expected_custody(&self) -> Decimal {
        self.inflow - self.outflow
    }

    /// # Errors
    /// Returns [`SwapError::CustodyInvariantViolation`] if `actual` differs
    /// from [`Self::expected_custody`].
    /// Any quarantined swap is also a violation.
    pub fn verify(&self, actual: Decimal) -> Result<()> {
        if self.quarantined > 0 {
            return Err(SwapError::CustodyInvariantViolation {
                reason: format!(
                    "{} swap(s) quarantined after a failed payout reversal",
                    self.quarantined
                ),
            });
        }
        let expected = self.expected_custody();
        if actual != expected {
            return Err(SwapError::CustodyInvariantViolation {
                reason: format!(
                    "escrow holds {actual} but expected {expected} \
                     (inflow={}, outflow={})",
                    self.inflow, self.outflow
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_inflow(&self) -> Decimal {
        self.inflow
    }

    #[must_use]
    pub fn total_outflow(&self) -> Decimal {
        self.outflow
    }

    #[must_use]
    pub fn lock_count(&self) -> u64 {
        self.locks
    }

    #[must_use]
    pub fn resolution_count(&self) -> u64 {
        self.resolutions
    }

    #[must_use]
    pub fn quarantined_count(&self) -> u64 {
        self.quarantined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_custody_is_zero() {
        let audit = CustodyAudit::new();
        assert_eq!(audit.expected_custody(), Decimal::ZERO);
        assert!(audit.verify(Decimal::ZERO).is_ok());
    }

    #[test]
    fn locks_increase_expected() {
        let mut audit = CustodyAudit::new();
        audit.record_lock(Decimal::new(1000, 0)).unwrap();
        audit.record_lock(Decimal::new(500, 0)).unwrap();
        assert_eq!(audit.expected_custody(), Decimal::new(1500, 0));
        assert_eq!(audit.lock_count(), 2);
    }

    #[test]
    fn resolutions_decrease_expected() {
        let mut audit = CustodyAudit::new();
        audit.record_lock(Decimal::new(1000, 0)).unwrap();
        audit.record_resolution(Decimal::new(1000, 0));
        assert_eq!(audit.expected_custody(), Decimal::ZERO);
        assert_eq!(audit.total_inflow(), Decimal::new(1000, 0));
        assert_eq!(audit.total_outflow(), Decimal::new(1000, 0));
        assert_eq!(audit.resolution_count(), 1);
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut audit = CustodyAudit::new();
        audit.record_lock(Decimal::new(10, 0)).unwrap();
        let err = audit.verify(Decimal::new(11, 0)).unwrap_err();
        assert!(matches!(err, SwapError::CustodyInvariantViolation { .. }));
        assert!(err.to_string().contains("inflow=10"));
    }

    #[test]
    fn overflowing_lock_leaves_audit_unchanged() {
        let mut audit = CustodyAudit::new();
        audit.record_lock(Decimal::MAX).unwrap();
        let before = audit.clone();
        let err = audit.record_lock(Decimal::ONE).unwrap_err();
        assert!(matches!(err, SwapError::InvalidAmount { .. }));
        assert_eq!(audit, before);
    }

    #[test]
    fn reverted_lock_restores_totals() {
        let mut audit = CustodyAudit::new();
        audit.record_lock(Decimal::new(10, 0)).unwrap();
        audit.revert_lock(Decimal::new(10, 0));
        assert_eq!(audit, CustodyAudit::new());
    }

    #[test]
    fn quarantine_fails_verification() {
        let mut audit = CustodyAudit::new();
        audit.record_lock(Decimal::new(10, 0)).unwrap();
        audit.record_quarantine();
        let err = audit.verify(Decimal::new(10, 0)).unwrap_err();
        assert!(err.to_string().contains("quarantined"));
        assert_eq!(audit.quarantined_count(), 1);
    }
}
