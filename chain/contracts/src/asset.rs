//! Fungible asset service boundary
//!
//! The contracts never own token balances directly. They call out to an
//! external token contract through [`AssetService`] and act on its boolean
//! results. [`InMemoryAsset`] is a complete in-process token used by tests
//! and simulations; it can be switched into a failing mode to exercise the
//! rollback paths.

use std::collections::HashMap;

use types::ids::Address;
use types::numeric::Amount;

use crate::errors::AssetError;

/// Calls the contracts make on the external token contract.
///
/// `caller` is the account on whose behalf the token contract executes the
/// call, i.e. the calling contract's own address for `transfer` and `burn`.
pub trait AssetService {
    /// Address of the token contract itself.
    fn contract_address(&self) -> Address;

    fn balance_of(&self, holder: &Address) -> Amount;

    /// Move `amount` of `caller`'s tokens to `to`.
    fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> bool;

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> bool;

    fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) -> bool;

    /// Destroy `amount` of `caller`'s tokens.
    fn burn(&mut self, caller: &Address, amount: Amount) -> Result<(), AssetError>;
}

/// In-process token ledger with allowances and burn.
#[derive(Debug, Clone)]
pub struct InMemoryAsset {
    address: Address,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
    /// When set, every transfer and burn is rejected.
    failing: bool,
}

impl InMemoryAsset {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            failing: false,
        }
    }

    /// Create tokens for `to`. Setup helper; not part of the service surface.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), AssetError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        let balance = self.balances.entry(to).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(AssetError::Overflow)?;
        self.total_supply = supply;
        Ok(())
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Toggle failure injection.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn move_tokens(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), AssetError> {
        if self.failing {
            return Err(AssetError::Rejected);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }

    fn spend_allowance(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(AssetError::InsufficientAllowance {
                required: amount,
                available: allowed,
            });
        }
        self.move_tokens(from, to, amount)?;
        self.allowances.insert((*from, *spender), allowed - amount);
        Ok(())
    }
}

impl AssetService for InMemoryAsset {
    fn contract_address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> bool {
        match self.move_tokens(caller, to, amount) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(from = %caller, to = %to, amount, %err, "token transfer rejected");
                false
            }
        }
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> bool {
        match self.spend_allowance(spender, from, to, amount) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(spender = %spender, from = %from, amount, %err, "token transferFrom rejected");
                false
            }
        }
    }

    fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) -> bool {
        if self.failing {
            return false;
        }
        self.allowances.insert((*caller, *spender), amount);
        true
    }

    fn burn(&mut self, caller: &Address, amount: Amount) -> Result<(), AssetError> {
        if self.failing {
            return Err(AssetError::Rejected);
        }
        let available = self.balance_of(caller);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        self.balances.insert(*caller, available - amount);
        self.total_supply -= amount;
        Ok(())
    }
}
