//! Shared security primitives for contract modules
//!
//! Caller-identity checks used by the escrow and the token locker. Both
//! contracts have a single transferable owner; the escrow additionally has an
//! owner-appointed accountant. The miner role is implicit (positive miner
//! balance) and is checked by the escrow itself.

use serde::{Deserialize, Serialize};
use types::ids::Address;

/// Roles a caller can be required to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Contract administrator
    Owner,
    /// Moves customer funds to miners, issues refunds
    Accountant,
    /// Any address holding a positive miner balance
    Miner,
}

/// Log a rejected privileged call.
pub(crate) fn log_denied(contract: &'static str, role: Role, caller: &Address) {
    tracing::warn!(contract, ?role, caller = %caller, "caller lacks required role");
}

/// Single owner with a two-phase handoff.
///
/// The current owner proposes a candidate; ownership moves only when that
/// candidate accepts. Until then the old owner keeps full control and may
/// replace the proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    owner: Address,
    pending: Option<Address>,
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            pending: None,
        }
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Candidate awaiting acceptance, if any.
    pub fn pending(&self) -> Option<Address> {
        self.pending
    }

    /// Record `candidate` as the pending owner. Returns `false` if `caller`
    /// is not the current owner.
    pub fn propose(&mut self, caller: &Address, candidate: Address) -> bool {
        if !self.is_owner(caller) {
            return false;
        }
        self.pending = Some(candidate);
        true
    }

    /// Complete the handoff. Returns the previous owner, or `None` if
    /// `caller` is not the pending candidate.
    pub fn accept(&mut self, caller: &Address) -> Option<Address> {
        if self.pending != Some(*caller) {
            return None;
        }
        let previous = self.owner;
        self.owner = *caller;
        self.pending = None;
        Some(previous)
    }
}

/// Owner plus accountant, as held by the escrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControl {
    ownership: Ownership,
    accountant: Address,
}

impl AccessControl {
    /// Accountant starts unset (`Address::ZERO`) unless given.
    pub fn new(owner: Address, accountant: Option<Address>) -> Self {
        Self {
            ownership: Ownership::new(owner),
            accountant: accountant.unwrap_or(Address::ZERO),
        }
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.ownership.is_owner(caller)
    }

    /// The zero address never passes, so an unset accountant locks the role.
    pub fn is_accountant(&self, caller: &Address) -> bool {
        !self.accountant.is_zero() && *caller == self.accountant
    }

    pub fn accountant(&self) -> Address {
        self.accountant
    }

    /// Replace the accountant, returning the previous one. Owner-only.
    pub fn set_accountant(&mut self, caller: &Address, accountant: Address) -> Option<Address> {
        if !self.is_owner(caller) {
            return None;
        }
        let previous = self.accountant;
        self.accountant = accountant;
        Some(previous)
    }

    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    pub fn ownership_mut(&mut self) -> &mut Ownership {
        &mut self.ownership
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xb0)
    }

    fn eve() -> Address {
        Address::repeat_byte(0xee)
    }

    // --- Ownership tests ---

    #[test]
    fn test_ownership_owner() {
        let own = Ownership::new(alice());
        assert!(own.is_owner(&alice()));
        assert!(!own.is_owner(&bob()));
        assert_eq!(own.pending(), None);
    }

    #[test]
    fn test_ownership_two_phase_handoff() {
        let mut own = Ownership::new(alice());
        assert!(own.propose(&alice(), bob()));
        // Still alice until bob accepts
        assert!(own.is_owner(&alice()));
        assert_eq!(own.pending(), Some(bob()));

        assert_eq!(own.accept(&bob()), Some(alice()));
        assert!(own.is_owner(&bob()));
        assert!(!own.is_owner(&alice()));
        assert_eq!(own.pending(), None);
    }

    #[test]
    fn test_ownership_non_owner_cannot_propose() {
        let mut own = Ownership::new(alice());
        assert!(!own.propose(&eve(), eve()));
        assert_eq!(own.pending(), None);
    }

    #[test]
    fn test_ownership_only_candidate_can_accept() {
        let mut own = Ownership::new(alice());
        own.propose(&alice(), bob());
        assert_eq!(own.accept(&eve()), None);
        assert!(own.is_owner(&alice()));
    }

    #[test]
    fn test_ownership_proposal_replaced() {
        let mut own = Ownership::new(alice());
        own.propose(&alice(), eve());
        own.propose(&alice(), bob());
        assert_eq!(own.accept(&eve()), None);
        assert_eq!(own.accept(&bob()), Some(alice()));
    }

    // --- AccessControl tests ---

    #[test]
    fn test_unset_accountant_matches_nobody() {
        let ac = AccessControl::new(alice(), None);
        assert!(!ac.is_accountant(&Address::ZERO));
        assert!(!ac.is_accountant(&bob()));
    }

    #[test]
    fn test_set_accountant() {
        let mut ac = AccessControl::new(alice(), None);
        assert_eq!(ac.set_accountant(&alice(), bob()), Some(Address::ZERO));
        assert!(ac.is_accountant(&bob()));
        assert_eq!(ac.accountant(), bob());
    }

    #[test]
    fn test_set_accountant_unauthorized() {
        let mut ac = AccessControl::new(alice(), None);
        assert_eq!(ac.set_accountant(&eve(), eve()), None);
        assert!(!ac.is_accountant(&eve()));
    }

    #[test]
    fn test_owner_is_not_accountant() {
        let ac = AccessControl::new(alice(), Some(bob()));
        assert!(!ac.is_accountant(&alice()));
        assert!(!ac.is_owner(&bob()));
    }
}
