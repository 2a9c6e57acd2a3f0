//! Contract events
//!
//! Events are immutable records appended to a contract's log after an
//! operation commits. Nothing in the contracts reads them back.

use serde::{Deserialize, Serialize};
use types::fee::CommissionPolicy;
use types::ids::Address;
use types::numeric::{Amount, Timestamp};

/// Accountant role reassigned by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountantChanged {
    pub old: Address,
    pub new: Address,
}

/// Escrow commission policy replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionPercentChanged {
    pub policy: CommissionPolicy,
}

/// Asset contract reference replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetContractChanged {
    pub old: Address,
    pub new: Address,
}

/// Customer funds pulled into the escrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub sender: Address,
    pub amount: Amount,
}

/// Accountant moved customer funds to a miner (gross amount, before fee)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

/// Customer balance paid back out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub customer: Address,
    pub amount: Amount,
}

/// Unlock date moved forward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensLocked {
    pub amount: Amount,
    pub until: Timestamp,
}

/// Locked tokens released to an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensUnlocked {
    pub addr: Address,
    pub amount: Amount,
    pub date: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensAllocated {
    pub user: Address,
    pub amount: Amount,
    pub new_balance: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensReturnedByUser {
    pub user: Address,
    pub amount: Amount,
    pub new_balance: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensBurned {
    pub amount: Amount,
}

/// First half of the ownership handoff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipProposed {
    pub owner: Address,
    pub candidate: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub old: Address,
    pub new: Address,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    AccountantChanged(AccountantChanged),
    CommissionPercentChanged(CommissionPercentChanged),
    AssetContractChanged(AssetContractChanged),
    Deposit(Deposit),
    Transfer(Transfer),
    Refund(Refund),
    TokensLocked(TokensLocked),
    TokensUnlocked(TokensUnlocked),
    TokensAllocated(TokensAllocated),
    TokensReturnedByUser(TokensReturnedByUser),
    TokensBurned(TokensBurned),
    ShareDisabled,
    OwnershipProposed(OwnershipProposed),
    OwnershipTransferred(OwnershipTransferred),
}

impl ContractEvent {
    /// Stable event name, matching the variant tag in serialized form
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::AccountantChanged(_) => "AccountantChanged",
            ContractEvent::CommissionPercentChanged(_) => "CommissionPercentChanged",
            ContractEvent::AssetContractChanged(_) => "AssetContractChanged",
            ContractEvent::Deposit(_) => "Deposit",
            ContractEvent::Transfer(_) => "Transfer",
            ContractEvent::Refund(_) => "Refund",
            ContractEvent::TokensLocked(_) => "TokensLocked",
            ContractEvent::TokensUnlocked(_) => "TokensUnlocked",
            ContractEvent::TokensAllocated(_) => "TokensAllocated",
            ContractEvent::TokensReturnedByUser(_) => "TokensReturnedByUser",
            ContractEvent::TokensBurned(_) => "TokensBurned",
            ContractEvent::ShareDisabled => "ShareDisabled",
            ContractEvent::OwnershipProposed(_) => "OwnershipProposed",
            ContractEvent::OwnershipTransferred(_) => "OwnershipTransferred",
        }
    }
}

/// Append-only event log owned by each contract instance.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<ContractEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and mirror it to the tracing subscriber.
    pub fn emit(&mut self, contract: &'static str, event: ContractEvent) {
        tracing::info!(contract, name = event.name(), detail = ?event, "event emitted");
        self.entries.push(event);
    }

    pub fn entries(&self) -> &[ContractEvent] {
        &self.entries
    }

    /// Drain all events (consume and clear).
    pub fn drain(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.entries)
    }

    /// Serialize the log as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }
}
