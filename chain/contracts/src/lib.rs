//! Mindsync settlement contracts
//!
//! Contract logic for the Mindsync token economy, written as deterministic
//! in-memory state machines. Token balances live on an external asset service
//! that the contracts call through the [`asset::AssetService`] trait.
//!
//! # Modules
//! - `errors`: Contract-specific error types with stable reason codes
//! - `events`: Contract events and the append-only event log
//! - `security`: Owner/accountant access control with two-phase ownership
//! - `asset`: Asset service boundary and an in-memory token
//! - `config`: Construction parameters, loadable from JSON
//! - `escrow`: Customer deposits, miner settlement, commission, refunds
//! - `locker`: Time-locked tokens with per-user allocations
//! - `host`: Serialized execution for multi-threaded callers

pub mod asset;
pub mod config;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod host;
pub mod locker;
pub mod security;
