//! # swapledger-settlement
//!
//! **Settlement Ledger**: escrow custody for cross-chain atomic swaps,
//! resolved by a single trusted coordinator.
//!
//! ## Architecture
//!
//! The ledger receives requests from two roles:
//! 1. The **proposer** calls `lock`, moving principal + security deposit
//!    into escrow through the [`ValueTransfer`] backend
//! 2. The **coordinator** calls `unlock` (pay the acceptor) or `abort`
//!    (refund the proposer) once it has decided the swap's outcome
//!
//! Every transition is all-or-nothing, emits a [`SwapEvent`] to the
//! configured [`EventSink`], and is accounted in the [`CustodyAudit`].
//!
//! ## Lifecycle
//!
//! ```text
//! lock (proposer) → LOCKED → unlock (coordinator) → UNLOCKED
//!                          → abort  (coordinator) → ABORTED
//! ```
//!
//! [`SwapEvent`]: swapledger_types::SwapEvent

pub mod balances;
pub mod custody;
pub mod event_sink;
pub mod ledger;
pub mod value_transfer;

pub use balances::InMemoryBalances;
pub use custody::CustodyAudit;
pub use event_sink::{ChannelSink, EventSink, NoopSink, RecordingSink};
pub use ledger::SettlementLedger;
pub use value_transfer::ValueTransfer;
