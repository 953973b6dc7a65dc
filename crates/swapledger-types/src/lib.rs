//! # swapledger-types
//!
//! Shared types, errors, and configuration for the **SwapLedger** escrow
//! state machine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`SwapId`], [`PartyId`]
//! - **Swap model**: [`SwapRecord`], [`SwapStatus`], [`LockRequest`], [`ResolveRequest`]
//! - **Payout model**: [`Payout`], [`PayoutReason`], [`Resolution`]
//! - **Events**: [`SwapEvent`], [`SwapEventKind`]
//! - **Configuration**: [`LedgerConfig`], [`SecurityPolicy`]
//! - **Errors**: [`SwapError`] with `SL_ERR_` codes, [`ErrorKind`]
//! - **Constants**: system-wide defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod payout;
pub mod swap;

// Re-export all primary types at crate root for ergonomic imports:
//   use swapledger_types::{SwapId, SwapRecord, SwapError, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use payout::*;
pub use swap::*;

// Constants are accessed via `swapledger_types::constants::FOO`.
