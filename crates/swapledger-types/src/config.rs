//! Configuration for a Settlement Ledger instance.

use serde::{Deserialize, Serialize};

use crate::{PartyId, Result, SwapError};

/// Who receives the security deposit when a swap unlocks.
///
/// On abort the proposer is always made whole (principal + security).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPolicy {
    /// The deposit goes back to the proposer after an honest completion.
    #[default]
    ReturnToProposer,
    /// The deposit is paid to the acceptor together with the principal.
    PayToAcceptor,
}

/// Configuration for a single ledger.
///
/// The coordinator is fixed for the lifetime of the ledger: it is read once
/// at construction and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The only identity allowed to unlock or abort.
    pub coordinator: PartyId,
    /// Destination of the security deposit on unlock.
    #[serde(default)]
    pub security_policy: SecurityPolicy,
}

impl LedgerConfig {
    #[must_use]
    pub fn new(coordinator: PartyId) -> Self {
        Self {
            coordinator,
            security_policy: SecurityPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_security_policy(mut self, policy: SecurityPolicy) -> Self {
        self.security_policy = policy;
        self
    }

    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    /// Returns [`SwapError::Configuration`] on malformed JSON or an empty
    /// coordinator identity.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`SwapError::Configuration`] if the coordinator is empty.
    pub fn validate(&self) -> Result<()> {
        if self.coordinator.is_empty() {
            return Err(SwapError::Configuration(
                "coordinator identity must not be empty".into(),
            ));
        }
        Ok(())
    }
}
