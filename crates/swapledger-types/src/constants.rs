//! System-wide constants for SwapLedger.

/// Domain prefix for deterministic swap ids.
pub const SWAP_ID_DOMAIN: &[u8] = b"swapledger:swap_id:v1:";

/// Default capacity hint for a ledger's record map.
pub const DEFAULT_RECORD_CAPACITY: usize = 4_096;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ledger name.
pub const LEDGER_NAME: &str = "SwapLedger";
