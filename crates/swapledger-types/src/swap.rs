//! # SwapRecord: one escrow per swap identifier
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  unlock (coordinator)  ┌──────────┐
//!   │ LOCKED ├───────────────────────▶│ UNLOCKED │
//!   └───┬────┘                        └──────────┘
//!       │ abort (coordinator)
//!       ▼
//!   ┌─────────┐
//!   │ ABORTED │
//!   └─────────┘
//! ```
//!
//! ## Properties
//!
//! - **Created once**: a record exists only after a successful `lock`
//! - **Single resolution**: LOCKED → UNLOCKED / ABORTED is irreversible
//! - **Retained**: resolved records stay in the ledger for audit

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PartyId, Result, SwapError, SwapId};

/// The lifecycle state of a swap escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapStatus {
    /// Principal plus security deposit are held in escrow.
    Locked,
    /// Funds were released to the acceptor. **Terminal.**
    Unlocked,
    /// Funds were refunded to the proposer. **Terminal.**
    Aborted,
}

impl SwapStatus {
    /// Can a record in this status transition to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Locked, Self::Unlocked | Self::Aborted))
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Locked)
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::Unlocked => write!(f, "UNLOCKED"),
            Self::Aborted => write!(f, "ABORTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Parameters of a `lock` call. The caller identity is passed separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRequest {
    pub swap_id: SwapId,
    /// Party funding the escrow; must be the caller.
    pub proposer: PartyId,
    /// Beneficiary on successful unlock.
    pub acceptor: PartyId,
    /// Declared principal.
    pub principal_amount: Decimal,
    /// Security deposit posted alongside the principal.
    pub security_amount: Decimal,
    /// Value actually attached to the call. Must equal `principal_amount`.
    pub funded_value: Decimal,
}

impl LockRequest {
    /// Request whose attached funding equals the declared principal.
    #[must_use]
    pub fn new(
        swap_id: SwapId,
        proposer: PartyId,
        acceptor: PartyId,
        principal_amount: Decimal,
        security_amount: Decimal,
    ) -> Self {
        Self {
            swap_id,
            proposer,
            acceptor,
            principal_amount,
            security_amount,
            funded_value: principal_amount,
        }
    }

    /// Override the attached funding.
    #[must_use]
    pub fn with_funded_value(mut self, funded_value: Decimal) -> Self {
        self.funded_value = funded_value;
        self
    }

    /// Total value the proposer must move into escrow.
    ///
    /// # Errors
    /// Returns [`SwapError::InvalidAmount`] if the sum is not representable.
    pub fn escrow_total(&self) -> Result<Decimal> {
        self.principal_amount
            .checked_add(self.security_amount)
            .ok_or_else(|| SwapError::InvalidAmount {
                reason: format!(
                    "principal {} plus security deposit {} overflows",
                    self.principal_amount, self.security_amount
                ),
            })
    }
}

/// Parameters of an `unlock` / `abort` call. Must match the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub swap_id: SwapId,
    pub proposer: PartyId,
    pub acceptor: PartyId,
    pub principal_amount: Decimal,
}

impl ResolveRequest {
    #[must_use]
    pub fn new(
        swap_id: SwapId,
        proposer: PartyId,
        acceptor: PartyId,
        principal_amount: Decimal,
    ) -> Self {
        Self {
            swap_id,
            proposer,
            acceptor,
            principal_amount,
        }
    }

    /// Request that resolves `record` exactly as it was locked.
    #[must_use]
    pub fn for_record(record: &SwapRecord) -> Self {
        Self {
            swap_id: record.swap_id.clone(),
            proposer: record.proposer.clone(),
            acceptor: record.acceptor.clone(),
            principal_amount: record.principal_amount,
        }
    }
}

// ---------------------------------------------------------------------------
// SwapRecord
// ---------------------------------------------------------------------------

/// One escrow, keyed by `swap_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub swap_id: SwapId,
    pub proposer: PartyId,
    pub acceptor: PartyId,
    pub principal_amount: Decimal,
    pub security_amount: Decimal,
    pub status: SwapStatus,
    /// When the escrow was funded.
    pub locked_at: DateTime<Utc>,
    /// When the coordinator resolved it. `None` while locked.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Set when a payout could not be reversed. A quarantined record is
    /// never resolved.
    #[serde(default)]
    pub quarantined: bool,
}

impl SwapRecord {
    /// Build a freshly locked record from a validated request.
    #[must_use]
    pub fn locked(request: LockRequest, locked_at: DateTime<Utc>) -> Self {
        Self {
            swap_id: request.swap_id,
            proposer: request.proposer,
            acceptor: request.acceptor,
            principal_amount: request.principal_amount,
            security_amount: request.security_amount,
            status: SwapStatus::Locked,
            locked_at,
            resolved_at: None,
            quarantined: false,
        }
    }

    /// Value held in escrow for this record while it is locked.
    ///
    /// `lock` rejects unrepresentable totals, so this only saturates for
    /// records built by hand.
    #[must_use]
    pub fn escrowed_value(&self) -> Decimal {
        self.principal_amount.saturating_add(self.security_amount)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.status == SwapStatus::Locked
    }

    /// Locked and still resolvable.
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.is_locked() && !self.quarantined
    }

    /// First field of `request` that disagrees with this record, if any.
    #[must_use]
    pub fn mismatch(&self, request: &ResolveRequest) -> Option<&'static str> {
        if request.proposer != self.proposer {
            Some("proposer")
        } else if request.acceptor != self.acceptor {
            Some("acceptor")
        } else if request.principal_amount != self.principal_amount {
            Some("principal_amount")
        } else {
            None
        }
    }

    /// Move to a terminal status.
    ///
    /// # Errors
    /// Returns [`SwapError::InvalidState`] unless the record is `Locked` and
    /// `target` is terminal.
    pub fn resolve(&mut self, target: SwapStatus, at: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(SwapError::InvalidState {
                swap_id: self.swap_id.clone(),
                status: self.status,
            });
        }
        self.status = target;
        self.resolved_at = Some(at);
        Ok(())
    }
}

/// Sample requests for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl LockRequest {
    /// Principal 100,000,000 and security 1,000 between `proposer` and
    /// `acceptor`, fully funded.
    pub fn sample(swap_id: &str) -> Self {
        Self::new(
            SwapId::new(swap_id),
            PartyId::new("proposer"),
            PartyId::new("acceptor"),
            Decimal::new(100_000_000, 0),
            Decimal::new(1_000, 0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> SwapRecord {
        SwapRecord::locked(LockRequest::sample("1"), Utc::now())
    }

    #[test]
    fn status_transitions_valid() {
        assert!(SwapStatus::Locked.can_transition_to(SwapStatus::Unlocked));
        assert!(SwapStatus::Locked.can_transition_to(SwapStatus::Aborted));
    }

    #[test]
    fn status_transitions_invalid() {
        assert!(!SwapStatus::Locked.can_transition_to(SwapStatus::Locked));
        assert!(!SwapStatus::Unlocked.can_transition_to(SwapStatus::Locked));
        assert!(!SwapStatus::Unlocked.can_transition_to(SwapStatus::Aborted));
        assert!(!SwapStatus::Aborted.can_transition_to(SwapStatus::Locked));
        assert!(!SwapStatus::Aborted.can_transition_to(SwapStatus::Unlocked));
    }

    #[test]
    fn locked_record_copies_request() {
        let record = make_record();
        assert_eq!(record.swap_id, SwapId::new("1"));
        assert_eq!(record.proposer, PartyId::new("proposer"));
        assert_eq!(record.acceptor, PartyId::new("acceptor"));
        assert_eq!(record.principal_amount, Decimal::new(100_000_000, 0));
        assert_eq!(record.security_amount, Decimal::new(1_000, 0));
        assert_eq!(record.escrowed_value(), Decimal::new(100_001_000, 0));
        assert!(record.is_locked());
        assert!(record.resolved_at.is_none());
    }

    #[test]
    fn resolve_once() {
        let mut record = make_record();
        record.resolve(SwapStatus::Unlocked, Utc::now()).unwrap();
        assert_eq!(record.status, SwapStatus::Unlocked);
        assert!(record.resolved_at.is_some());

        let err = record.resolve(SwapStatus::Aborted, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            SwapError::InvalidState {
                status: SwapStatus::Unlocked,
                ..
            }
        ));
        assert_eq!(record.status, SwapStatus::Unlocked);
    }

    #[test]
    fn resolve_to_locked_rejected() {
        let mut record = make_record();
        assert!(record.resolve(SwapStatus::Locked, Utc::now()).is_err());
        assert!(record.resolved_at.is_none());
    }

    #[test]
    fn mismatch_reports_first_field() {
        let record = make_record();
        let mut request = ResolveRequest::for_record(&record);
        assert_eq!(record.mismatch(&request), None);

        request.principal_amount = Decimal::ONE;
        assert_eq!(record.mismatch(&request), Some("principal_amount"));

        request.acceptor = PartyId::new("mallory");
        assert_eq!(record.mismatch(&request), Some("acceptor"));

        request.proposer = PartyId::new("mallory");
        assert_eq!(record.mismatch(&request), Some("proposer"));
    }

    #[test]
    fn funded_value_defaults_to_principal() {
        let request = LockRequest::sample("1");
        assert_eq!(request.funded_value, request.principal_amount);
        let underfunded = request.with_funded_value(Decimal::new(50_000, 0));
        assert_eq!(underfunded.funded_value, Decimal::new(50_000, 0));
    }

    #[test]
    fn escrow_total_overflow_is_invalid_amount() {
        let request = LockRequest::sample("1");
        assert_eq!(request.escrow_total().unwrap(), Decimal::new(100_001_000, 0));

        let mut huge = LockRequest::sample("2");
        huge.principal_amount = Decimal::MAX;
        huge.security_amount = Decimal::ONE;
        let err = huge.escrow_total().unwrap_err();
        assert!(matches!(err, SwapError::InvalidAmount { .. }));
    }

    #[test]
    fn quarantined_record_is_not_resolvable() {
        let mut record = make_record();
        assert!(record.is_resolvable());
        record.quarantined = true;
        assert!(record.is_locked());
        assert!(!record.is_resolvable());
    }

    #[test]
    fn record_without_quarantine_field_deserializes() {
        let mut json = serde_json::to_value(make_record()).unwrap();
        json.as_object_mut().unwrap().remove("quarantined");
        let record: SwapRecord = serde_json::from_value(json).unwrap();
        assert!(!record.quarantined);
    }

    #[test]
    fn record_serializes_amounts_as_strings() {
        let record = make_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["principal_amount"], "100000000");
        assert_eq!(json["status"], "Locked");
    }
}
