//! Integer token amounts and timestamps
//!
//! Token balances are unsigned integers in the token's smallest unit. All
//! ledger arithmetic on them is checked; an overflow aborts the operation.

/// Token amount in base units.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// The epoch-zero sentinel used for "never set" dates.
pub const EPOCH_ZERO: Timestamp = 0;
