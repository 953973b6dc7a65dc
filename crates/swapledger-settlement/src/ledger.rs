//! The Settlement Ledger: escrow records keyed by swap id.
//!
//! Every operation runs read → validate → transfer → write for one swap id
//! while holding that id's shard lock in the record map:
//! 1. Authorize the caller (proposer for `lock`, coordinator otherwise)
//! 2. Validate the request against the stored record (or its absence)
//! 3. Move value through the [`ValueTransfer`] backend
//! 4. Write the new record state and update the custody audit
//! 5. Emit the event
//!
//! If any step fails, nothing after it happens and nothing before it is
//! left behind. The one exception is a payout that can be neither completed
//! nor reversed: the record is then quarantined and never resolved.
//!
//! Lock order is always record shard → custody audit → value transfer →
//! custody audit → event sink. The custody mutex is never held across a
//! value transfer call.

use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use swapledger_types::{
    LedgerConfig, LockRequest, PartyId, Payout, PayoutReason, ResolveRequest, Resolution, Result,
    SecurityPolicy, SwapError, SwapEvent, SwapId, SwapRecord, SwapStatus, constants,
};
use tracing::{error, info, warn};

use crate::custody::CustodyAudit;
use crate::event_sink::{EventSink, NoopSink};
use crate::value_transfer::ValueTransfer;

/// Coordinator-resolved escrow ledger.
///
/// Cheap to share: wrap it in an `Arc` and call it from any thread.
pub struct SettlementLedger<V: ValueTransfer> {
    config: LedgerConfig,
    records: DashMap<SwapId, SwapRecord>,
    transfer: V,
    sink: Box<dyn EventSink>,
    custody: Mutex<CustodyAudit>,
}

impl<V: ValueTransfer> SettlementLedger<V> {
    /// Create a ledger resolved by `config.coordinator`.
    ///
    /// # Errors
    /// Returns [`SwapError::Configuration`] if the config is invalid.
    pub fn new(config: LedgerConfig, transfer: V) -> Result<Self> {
        config.validate()?;
        info!(
            ledger = constants::LEDGER_NAME,
            version = constants::VERSION,
            coordinator = %config.coordinator,
            security_policy = ?config.security_policy,
            "Settlement ledger created"
        );
        Ok(Self {
            config,
            records: DashMap::with_capacity(constants::DEFAULT_RECORD_CAPACITY),
            transfer,
            sink: Box::new(NoopSink),
            custody: Mutex::new(CustodyAudit::new()),
        })
    }

    /// Publish events to `sink` instead of discarding them.
    #[must_use]
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // -----------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------

    /// Fund a new escrow.
    ///
    /// Debits `principal_amount + security_amount` from the proposer in one
    /// value transfer call and stores the record as `Locked`.
    ///
    /// # Errors
    /// - `NotProposer` if `caller` is not `request.proposer`
    /// - `ValueMismatch` if `funded_value != principal_amount`
    /// - `InvalidAmount` if the principal is not positive, the security
    ///   deposit is negative, or the escrow total is not representable
    /// - `DuplicateSwap` if the id is already used
    /// - any error from [`ValueTransfer::debit`]
    pub fn lock(&self, caller: &PartyId, request: LockRequest) -> Result<SwapRecord> {
        if caller != &request.proposer {
            warn!(
                swap_id = %request.swap_id,
                caller = %caller,
                proposer = %request.proposer,
                "Lock rejected: caller is not the proposer"
            );
            return Err(SwapError::NotProposer {
                caller: caller.clone(),
                proposer: request.proposer,
            });
        }

        if request.funded_value != request.principal_amount {
            warn!(
                swap_id = %request.swap_id,
                funded = %request.funded_value,
                principal = %request.principal_amount,
                "Lock rejected: funded value does not equal principal"
            );
            return Err(SwapError::ValueMismatch {
                funded: request.funded_value,
                principal: request.principal_amount,
            });
        }

        if request.principal_amount <= Decimal::ZERO {
            return Err(SwapError::InvalidAmount {
                reason: format!("principal {} must be positive", request.principal_amount),
            });
        }
        if request.security_amount < Decimal::ZERO {
            return Err(SwapError::InvalidAmount {
                reason: format!(
                    "security deposit {} must not be negative",
                    request.security_amount
                ),
            });
        }

        let total = request.escrow_total()?;
        match self.records.entry(request.swap_id.clone()) {
            Entry::Occupied(_) => {
                warn!(swap_id = %request.swap_id, "Lock rejected: duplicate swap id");
                Err(SwapError::DuplicateSwap(request.swap_id))
            }
            Entry::Vacant(slot) => {
                self.custody.lock().record_lock(total)?;
                if let Err(err) = self.transfer.debit(&request.proposer, total) {
                    self.custody.lock().revert_lock(total);
                    return Err(err);
                }

                let record = SwapRecord::locked(request, Utc::now());
                let event = SwapEvent::locked(&record);
                let stored = slot.insert(record);
                self.sink.emit(&event);

                info!(
                    swap_id = %stored.swap_id,
                    proposer = %stored.proposer,
                    acceptor = %stored.acceptor,
                    principal = %stored.principal_amount,
                    security = %stored.security_amount,
                    "Swap locked"
                );
                Ok(stored.value().clone())
            }
        }
    }

    /// Release a locked escrow to the acceptor.
    ///
    /// The principal goes to the acceptor; the security deposit goes where
    /// the configured [`SecurityPolicy`] says.
    ///
    /// # Errors
    /// - `NotCoordinator` if `caller` is not the coordinator
    /// - `SwapNotFound` if no record exists
    /// - `InvalidState` if the record is already resolved
    /// - `SwapQuarantined` if an earlier payout for the swap could not be
    ///   reversed
    /// - `RecordMismatch` if the request disagrees with the record
    /// - any error from [`ValueTransfer::credit`]; earlier payouts are
    ///   reversed and the record stays `Locked`
    /// - `PayoutReversalFailed` if that reversal fails too; the record is
    ///   quarantined
    pub fn unlock(&self, caller: &PartyId, request: &ResolveRequest) -> Result<Resolution> {
        self.resolve(caller, request, SwapStatus::Unlocked)
    }

    /// Refund a locked escrow to the proposer (principal + security).
    ///
    /// # Errors
    /// Same as [`Self::unlock`].
    pub fn abort(&self, caller: &PartyId, request: &ResolveRequest) -> Result<Resolution> {
        self.resolve(caller, request, SwapStatus::Aborted)
    }

    fn resolve(
        &self,
        caller: &PartyId,
        request: &ResolveRequest,
        target: SwapStatus,
    ) -> Result<Resolution> {
        if caller != &self.config.coordinator {
            warn!(
                swap_id = %request.swap_id,
                caller = %caller,
                next_status = %target,
                "Resolution rejected: caller is not the coordinator"
            );
            return Err(SwapError::NotCoordinator {
                caller: caller.clone(),
            });
        }

        let mut entry = self.records.get_mut(&request.swap_id).ok_or_else(|| {
            warn!(
                swap_id = %request.swap_id,
                next_status = %target,
                "Resolution rejected: unknown swap id"
            );
            SwapError::SwapNotFound(request.swap_id.clone())
        })?;

        if !entry.status.can_transition_to(target) {
            warn!(
                swap_id = %request.swap_id,
                status = %entry.status,
                next_status = %target,
                "Resolution rejected: swap already resolved"
            );
            return Err(SwapError::InvalidState {
                swap_id: request.swap_id.clone(),
                status: entry.status,
            });
        }

        if entry.quarantined {
            warn!(
                swap_id = %request.swap_id,
                next_status = %target,
                "Resolution rejected: swap is quarantined"
            );
            return Err(SwapError::SwapQuarantined(request.swap_id.clone()));
        }

        if let Some(field) = entry.mismatch(request) {
            warn!(
                swap_id = %request.swap_id,
                field,
                "Resolution rejected: request does not match record"
            );
            return Err(SwapError::RecordMismatch {
                swap_id: request.swap_id.clone(),
                field,
            });
        }

        let payouts = self.payouts_for(&entry, target);
        if let Err(err) = self.pay_out(&request.swap_id, &payouts) {
            if matches!(err, SwapError::PayoutReversalFailed { .. }) {
                entry.quarantined = true;
                self.custody.lock().record_quarantine();
                error!(
                    swap_id = %request.swap_id,
                    error = %err,
                    "Swap quarantined"
                );
            }
            return Err(err);
        }

        let released = entry.escrowed_value();
        entry.resolve(target, Utc::now())?;
        self.custody.lock().record_resolution(released);

        let event = match target {
            SwapStatus::Unlocked => SwapEvent::unlocked(&entry),
            _ => SwapEvent::aborted(&entry),
        };
        self.sink.emit(&event);

        info!(
            swap_id = %entry.swap_id,
            status = %entry.status,
            released = %released,
            payouts = payouts.len(),
            "Swap resolved"
        );
        Ok(Resolution {
            record: entry.value().clone(),
            payouts,
        })
    }

    /// Credits that move a record's full escrowed value out for `target`.
    fn payouts_for(&self, record: &SwapRecord, target: SwapStatus) -> Vec<Payout> {
        let mut payouts = Vec::with_capacity(2);
        match target {
            SwapStatus::Unlocked => {
                payouts.push(Payout::new(
                    record.acceptor.clone(),
                    record.principal_amount,
                    PayoutReason::Principal,
                ));
                let security_to = match self.config.security_policy {
                    SecurityPolicy::ReturnToProposer => &record.proposer,
                    SecurityPolicy::PayToAcceptor => &record.acceptor,
                };
                payouts.push(Payout::new(
                    security_to.clone(),
                    record.security_amount,
                    PayoutReason::Security,
                ));
            }
            SwapStatus::Aborted | SwapStatus::Locked => {
                payouts.push(Payout::new(
                    record.proposer.clone(),
                    record.principal_amount,
                    PayoutReason::Refund,
                ));
                payouts.push(Payout::new(
                    record.proposer.clone(),
                    record.security_amount,
                    PayoutReason::Security,
                ));
            }
        }
        payouts.retain(|p| !p.amount.is_zero());
        payouts
    }

    /// Apply `payouts` in order. If one fails, reverse the ones already made.
    ///
    /// Returns the credit error when every reversal succeeded, and
    /// `PayoutReversalFailed` otherwise.
    fn pay_out(&self, swap_id: &SwapId, payouts: &[Payout]) -> Result<()> {
        for (i, payout) in payouts.iter().enumerate() {
            if let Err(err) = self.transfer.credit(&payout.recipient, payout.amount) {
                warn!(
                    swap_id = %swap_id,
                    recipient = %payout.recipient,
                    amount = %payout.amount,
                    error = %err,
                    "Payout failed; reversing earlier payouts"
                );
                let mut unreversed = Vec::new();
                for done in payouts[..i].iter().rev() {
                    if let Err(reversal) = self.transfer.debit(&done.recipient, done.amount) {
                        error!(
                            swap_id = %swap_id,
                            recipient = %done.recipient,
                            amount = %done.amount,
                            error = %reversal,
                            "Payout reversal failed"
                        );
                        unreversed.push(reversal.to_string());
                    }
                }
                if unreversed.is_empty() {
                    return Err(err);
                }
                return Err(SwapError::PayoutReversalFailed {
                    swap_id: swap_id.clone(),
                    cause: err.to_string(),
                    reversal: unreversed.join("; "),
                });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Snapshot of the record for `swap_id`.
    #[must_use]
    pub fn get(&self, swap_id: &SwapId) -> Option<SwapRecord> {
        self.records.get(swap_id).map(|r| r.value().clone())
    }

    #[must_use]
    pub fn status(&self, swap_id: &SwapId) -> Option<SwapStatus> {
        self.records.get(swap_id).map(|r| r.status)
    }

    /// Snapshot of every record, ordered by swap id.
    #[must_use]
    pub fn records(&self) -> Vec<SwapRecord> {
        let mut all: Vec<SwapRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.swap_id.cmp(&b.swap_id));
        all
    }

    /// Number of records, resolved ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_locked()).count()
    }

    /// Value currently held in escrow across all resolvable records.
    ///
    /// Quarantined records are excluded: part of their value has already
    /// left escrow.
    #[must_use]
    pub fn escrow_balance(&self) -> Decimal {
        self.records
            .iter()
            .filter(|r| r.is_resolvable())
            .map(|r| r.escrowed_value())
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Check the escrow balance against recorded inflows and outflows.
    ///
    /// Only meaningful while no transition is in flight.
    ///
    /// # Errors
    /// Returns [`SwapError::CustodyInvariantViolation`] on mismatch or if
    /// any swap is quarantined.
    pub fn verify_custody(&self) -> Result<()> {
        let actual = self.escrow_balance();
        self.custody.lock().verify(actual)
    }

    /// Snapshot of the custody totals.
    #[must_use]
    pub fn custody(&self) -> CustodyAudit {
        self.custody.lock().clone()
    }

    #[must_use]
    pub fn coordinator(&self) -> &PartyId {
        &self.config.coordinator
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The value transfer backend.
    #[must_use]
    pub fn transfer(&self) -> &V {
        &self.transfer
    }
}
