//! Contract configuration
//!
//! Construction parameters for the escrow and the token locker. Both can be
//! built in code or loaded from JSON, e.g.
//!
//! ```json
//! { "address": "0x…", "owner": "0x…", "commission": { "mantissa": 20, "scale": 1 } }
//! ```

use serde::{Deserialize, Serialize};
use types::fee::CommissionPolicy;
use types::ids::Address;

/// Escrow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// The escrow's own account on the asset service
    pub address: Address,
    pub owner: Address,
    #[serde(default)]
    pub accountant: Option<Address>,
    /// Token contract; deposits and payouts fail until it is set
    #[serde(default)]
    pub asset_contract: Option<Address>,
    #[serde(default)]
    pub commission: CommissionPolicy,
}

impl EscrowConfig {
    /// Minimal configuration: no accountant, no asset contract, zero commission.
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            accountant: None,
            asset_contract: None,
            commission: CommissionPolicy::ZERO,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Token locker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockerConfig {
    /// The locker's own account on the asset service
    pub address: Address,
    pub owner: Address,
    /// Token contract; fixed for the locker's lifetime
    pub asset_contract: Address,
}

impl LockerConfig {
    pub fn new(address: Address, owner: Address, asset_contract: Address) -> Self {
        Self {
            address,
            owner,
            asset_contract,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
