//! Types library for the Mindsync settlement contracts
//!
//! Value types shared by the escrow and token-locker contracts, kept free of
//! any contract state so they can be reused by off-chain tooling.
//!
//! # Modules
//! - `ids`: Account identifiers (`Address`)
//! - `numeric`: Integer token amounts and timestamps
//! - `fee`: Commission policy and fee computation
//! - `errors`: Error taxonomy for value construction

pub mod errors;
pub mod fee;
pub mod ids;
pub mod numeric;
