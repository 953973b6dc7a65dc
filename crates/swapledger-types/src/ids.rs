//! Identifiers used throughout SwapLedger.
//!
//! Both identifiers are opaque strings: swap ids are supplied by callers
//! (often mirroring an id already used on the counterparty chain) and party
//! ids are whatever address format the underlying ledger uses.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;

// ---------------------------------------------------------------------------
// SwapId
// ---------------------------------------------------------------------------

/// Caller-supplied key correlating a lock with its eventual resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapId(String);

impl SwapId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh time-ordered id (UUIDv7) for callers without an external id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Deterministic id from the two parties and a caller nonce.
    ///
    /// Watchers on both chains derive the **same** id for the same swap
    /// without exchanging it.
    #[must_use]
    pub fn deterministic(proposer: &PartyId, acceptor: &PartyId, nonce: u64) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(constants::SWAP_ID_DOMAIN);
        hasher.update(proposer.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(acceptor.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(nonce.to_le_bytes());
        let hash = hasher.finalize();
        Self(hex::encode(&hash[..16]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SwapId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ---------------------------------------------------------------------------
// PartyId
// ---------------------------------------------------------------------------

/// Identity of a ledger participant (proposer, acceptor, or coordinator).
///
/// Authentication of the caller behind a `PartyId` happens outside the
/// ledger; by the time an operation sees one it is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartyId {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
