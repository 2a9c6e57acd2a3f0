//! Token locker: time-locked owner funds with per-user allocations
//!
//! The locker holds a single pooled token balance. Part of it is allocated
//! to users; the rest is the owner's share. Nothing leaves the locker before
//! the unlock date, and the unlock date only ever moves forward.
//!
//! Invariant: `total_users_balance <= held balance`, so the owner's share
//! (`held - total_users_balance`) never dips below what users are owed.

use std::collections::HashMap;

use tracing::{info, warn};
use types::ids::Address;
use types::numeric::{Amount, Timestamp, EPOCH_ZERO};

use crate::asset::AssetService;
use crate::config::LockerConfig;
use crate::errors::LockerError;
use crate::events::{
    ContractEvent, EventLog, OwnershipProposed, OwnershipTransferred, TokensAllocated,
    TokensBurned, TokensLocked, TokensReturnedByUser, TokensUnlocked,
};
use crate::security::{log_denied, Ownership, Role};

const CONTRACT: &str = "locker";

/// Vesting ledger.
#[derive(Debug)]
pub struct TokensLocker {
    address: Address,
    /// Fixed at creation
    asset_contract: Address,
    ownership: Ownership,
    user_balances: HashMap<Address, Amount>,
    total_users_balance: Amount,
    unlock_date: Timestamp,
    share_enabled: bool,
    events: EventLog,
}

impl TokensLocker {
    /// Locked until the first `lock` call sets a date; sharing enabled.
    pub fn new(config: LockerConfig) -> Self {
        info!(
            contract = CONTRACT,
            address = %config.address,
            owner = %config.owner,
            asset = %config.asset_contract,
            "token locker initialized"
        );
        Self {
            address: config.address,
            asset_contract: config.asset_contract,
            ownership: Ownership::new(config.owner),
            user_balances: HashMap::new(),
            total_users_balance: 0,
            unlock_date: EPOCH_ZERO,
            share_enabled: true,
            events: EventLog::new(),
        }
    }

    // ───────────────────────── Lock schedule ─────────────────────────

    /// Move the unlock date forward. Owner-only.
    ///
    /// `until` must be later than both the current unlock date and `now`.
    pub fn lock(
        &mut self,
        asset: &dyn AssetService,
        caller: &Address,
        until: Timestamp,
        now: Timestamp,
    ) -> Result<ContractEvent, LockerError> {
        self.require_owner(caller)?;
        if until <= self.unlock_date || until <= now {
            return Err(LockerError::InvalidUnlockDate {
                requested: until,
                current: self.unlock_date,
            });
        }
        let held = self.held(asset)?;
        self.unlock_date = until;
        Ok(self.emit(ContractEvent::TokensLocked(TokensLocked {
            amount: held,
            until,
        })))
    }

    /// Permanently stop allocations. Owner-only; no user may hold a balance.
    pub fn disable_share(&mut self, caller: &Address) -> Result<ContractEvent, LockerError> {
        self.require_owner(caller)?;
        if self.total_users_balance != 0 {
            return Err(LockerError::UsersStillAllocated {
                allocated: self.total_users_balance,
            });
        }
        self.share_enabled = false;
        Ok(self.emit(ContractEvent::ShareDisabled))
    }

    // ───────────────────────── Unlocking ─────────────────────────

    /// Release the whole unallocated share to the owner. Owner-only.
    pub fn unlock_owner(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        now: Timestamp,
    ) -> Result<ContractEvent, LockerError> {
        self.require_owner(caller)?;
        self.require_unlocked(now)?;

        let owner_share = self.owner_share(asset)?;
        if owner_share == 0 {
            return Err(LockerError::ZeroOwnerBalance);
        }

        let owner = self.ownership.owner();
        self.push_transfer(asset, &owner, owner_share)?;

        Ok(self.emit(ContractEvent::TokensUnlocked(TokensUnlocked {
            addr: owner,
            amount: owner_share,
            date: now,
        })))
    }

    /// Release `amount` of `user`'s allocation to `user`.
    ///
    /// Callable by the user or by the owner on the user's behalf.
    pub fn unlock_for(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        user: &Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<ContractEvent, LockerError> {
        if caller != user && !self.ownership.is_owner(caller) {
            return Err(LockerError::AccessDenied);
        }
        self.require_unlocked(now)?;
        if amount == 0 {
            return Err(LockerError::InvalidAmount);
        }
        let held = self.held(asset)?;
        if held < amount {
            return Err(LockerError::InsufficientContractBalance {
                required: amount,
                available: held,
            });
        }
        let balance = self.user_balance(user);
        if balance < amount {
            return Err(LockerError::InsufficientUserBalance {
                requested: amount,
                balance,
            });
        }
        let new_total = self
            .total_users_balance
            .checked_sub(amount)
            .ok_or(LockerError::Overflow)?;

        self.push_transfer(asset, user, amount)?;

        self.total_users_balance = new_total;
        set_or_clear(&mut self.user_balances, *user, balance - amount);

        Ok(self.emit(ContractEvent::TokensUnlocked(TokensUnlocked {
            addr: *user,
            amount,
            date: now,
        })))
    }

    /// Release the caller's whole allocation.
    pub fn unlock_all(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        now: Timestamp,
    ) -> Result<ContractEvent, LockerError> {
        let amount = self.user_balance(caller);
        self.unlock_for(asset, caller, caller, amount, now)
    }

    // ───────────────────────── Allocation ─────────────────────────

    /// Grant `user` a claim on `amount` of the owner's share. Owner-only.
    ///
    /// Returns the user's new balance.
    pub fn allocate_for(
        &mut self,
        asset: &dyn AssetService,
        caller: &Address,
        user: &Address,
        amount: Amount,
    ) -> Result<Amount, LockerError> {
        self.require_owner(caller)?;
        if !self.share_enabled {
            return Err(LockerError::SharingDisabled);
        }
        let available = self.owner_share(asset)?;
        if available < amount {
            return Err(LockerError::InsufficientOwnerBalance {
                requested: amount,
                available,
            });
        }
        if self.ownership.is_owner(user) {
            return Err(LockerError::SelfAllocationDenied);
        }

        let new_balance = self
            .user_balance(user)
            .checked_add(amount)
            .ok_or(LockerError::Overflow)?;
        let new_total = self
            .total_users_balance
            .checked_add(amount)
            .ok_or(LockerError::Overflow)?;

        set_or_clear(&mut self.user_balances, *user, new_balance);
        self.total_users_balance = new_total;

        self.emit(ContractEvent::TokensAllocated(TokensAllocated {
            user: *user,
            amount,
            new_balance,
        }));
        Ok(new_balance)
    }

    /// Hand the caller's allocation back to the owner's share.
    ///
    /// Returns the caller's new balance.
    pub fn give_up(&mut self, caller: &Address, amount: Amount) -> Result<Amount, LockerError> {
        let balance = self.user_balance(caller);
        if balance == 0 {
            return Err(LockerError::AccessDenied);
        }
        // NOTE: the comparator is inverted relative to a plain "not more than
        // you hold" check: a partial give-up (`amount < balance`) is rejected.
        // Together with the checked subtraction below, only `amount == balance`
        // can succeed. Kept as-is for protocol compatibility.
        if amount < balance {
            return Err(LockerError::InsufficientUserBalance {
                requested: amount,
                balance,
            });
        }
        let new_balance =
            balance
                .checked_sub(amount)
                .ok_or(LockerError::InsufficientUserBalance {
                    requested: amount,
                    balance,
                })?;
        let new_total = self
            .total_users_balance
            .checked_sub(amount)
            .ok_or(LockerError::Overflow)?;

        set_or_clear(&mut self.user_balances, *caller, new_balance);
        self.total_users_balance = new_total;

        self.emit(ContractEvent::TokensReturnedByUser(TokensReturnedByUser {
            user: *caller,
            amount,
            new_balance,
        }));
        Ok(new_balance)
    }

    pub fn give_up_all(&mut self, caller: &Address) -> Result<Amount, LockerError> {
        let amount = self.user_balance(caller);
        self.give_up(caller, amount)
    }

    /// Burn part of the owner's share. Owner-only.
    ///
    /// The owner's share must strictly exceed `amount`.
    pub fn burn_owner_tokens(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        amount: Amount,
    ) -> Result<ContractEvent, LockerError> {
        self.require_owner(caller)?;
        let available = self.owner_share(asset)?;
        if available <= amount {
            return Err(LockerError::InsufficientOwnerBalance {
                requested: amount,
                available,
            });
        }
        asset.burn(&self.address, amount).map_err(|err| {
            warn!(contract = CONTRACT, amount, %err, "burn failed");
            err
        })?;
        Ok(self.emit(ContractEvent::TokensBurned(TokensBurned { amount })))
    }

    // ───────────────────────── Ownership ─────────────────────────

    /// Start an ownership handoff. Owner-only.
    pub fn propose_owner(
        &mut self,
        caller: &Address,
        candidate: Address,
    ) -> Result<ContractEvent, LockerError> {
        if candidate.is_zero() {
            return Err(LockerError::InvalidAddress {
                reason: "owner cannot be the zero address".to_string(),
            });
        }
        if !self.ownership.propose(caller, candidate) {
            log_denied(CONTRACT, Role::Owner, caller);
            return Err(LockerError::Unauthorized);
        }
        Ok(self.emit(ContractEvent::OwnershipProposed(OwnershipProposed {
            owner: *caller,
            candidate,
        })))
    }

    /// Finish an ownership handoff. Only the proposed candidate may call.
    pub fn accept_ownership(&mut self, caller: &Address) -> Result<ContractEvent, LockerError> {
        let old = self
            .ownership
            .accept(caller)
            .ok_or(LockerError::Unauthorized)?;
        Ok(self.emit(ContractEvent::OwnershipTransferred(OwnershipTransferred {
            old,
            new: *caller,
        })))
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Tokens the locker holds on the asset service.
    pub fn asset_balance(&self, asset: &dyn AssetService) -> Result<Amount, LockerError> {
        self.held(asset)
    }

    /// Held balance not allocated to any user.
    pub fn owner_share(&self, asset: &dyn AssetService) -> Result<Amount, LockerError> {
        Ok(self.held(asset)?.saturating_sub(self.total_users_balance))
    }

    pub fn user_balance(&self, user: &Address) -> Amount {
        self.user_balances.get(user).copied().unwrap_or(0)
    }

    pub fn total_users_balance(&self) -> Amount {
        self.total_users_balance
    }

    /// Non-zero user allocations.
    pub fn user_balances(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.user_balances.iter()
    }

    pub fn unlock_date(&self) -> Timestamp {
        self.unlock_date
    }

    pub fn is_share_enabled(&self) -> bool {
        self.share_enabled
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.ownership.pending()
    }

    pub fn asset_contract(&self) -> Address {
        self.asset_contract
    }

    pub fn address(&self) -> Address {
        self.address
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[ContractEvent] {
        self.events.entries()
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        self.events.drain()
    }

    /// Pending events as a JSON array, for export to off-chain indexers.
    pub fn events_json(&self) -> Result<String, serde_json::Error> {
        self.events.to_json()
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    fn emit(&mut self, event: ContractEvent) -> ContractEvent {
        self.events.emit(CONTRACT, event.clone());
        event
    }

    fn require_owner(&self, caller: &Address) -> Result<(), LockerError> {
        if !self.ownership.is_owner(caller) {
            log_denied(CONTRACT, Role::Owner, caller);
            return Err(LockerError::Unauthorized);
        }
        Ok(())
    }

    fn require_unlocked(&self, now: Timestamp) -> Result<(), LockerError> {
        if now < self.unlock_date {
            return Err(LockerError::TooEarly {
                unlock_date: self.unlock_date,
            });
        }
        Ok(())
    }

    /// Held balance, after checking the service is the locker's token.
    fn held(&self, asset: &dyn AssetService) -> Result<Amount, LockerError> {
        if asset.contract_address() != self.asset_contract {
            return Err(LockerError::InvalidAddress {
                reason: format!(
                    "asset service {} is not the locked token {}",
                    asset.contract_address(),
                    self.asset_contract
                ),
            });
        }
        Ok(asset.balance_of(&self.address))
    }

    fn push_transfer(
        &self,
        asset: &mut dyn AssetService,
        to: &Address,
        amount: Amount,
    ) -> Result<(), LockerError> {
        if !asset.transfer(&self.address, to, amount) {
            warn!(contract = CONTRACT, to = %to, amount, "unlock transfer failed");
            return Err(LockerError::TransferFailed);
        }
        Ok(())
    }
}

fn set_or_clear(balances: &mut HashMap<Address, Amount>, key: Address, amount: Amount) {
    if amount == 0 {
        balances.remove(&key);
    } else {
        balances.insert(key, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::InMemoryAsset;

    const NOW: Timestamp = 1_700_000_000;
    const DAY: Timestamp = 86_400;

    fn owner() -> Address {
        Address::repeat_byte(0x01)
    }

    fn locker_addr() -> Address {
        Address::repeat_byte(0x10)
    }

    fn token_addr() -> Address {
        Address::repeat_byte(0x70)
    }

    fn user() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn eve() -> Address {
        Address::repeat_byte(0xee)
    }

    fn setup(held: Amount) -> (TokensLocker, InMemoryAsset) {
        let locker = TokensLocker::new(LockerConfig::new(locker_addr(), owner(), token_addr()));
        let mut token = InMemoryAsset::new(token_addr());
        token.mint(locker_addr(), held).unwrap();
        (locker, token)
    }

    // ─── Lock ───

    #[test]
    fn test_initial_state() {
        let (locker, token) = setup(1000);
        assert_eq!(locker.unlock_date(), EPOCH_ZERO);
        assert!(locker.is_share_enabled());
        assert_eq!(locker.asset_balance(&token).unwrap(), 1000);
        assert_eq!(locker.owner_share(&token).unwrap(), 1000);
    }

    #[test]
    fn test_lock_moves_forward() {
        let (mut locker, token) = setup(1000);
        let event = locker.lock(&token, &owner(), NOW + DAY, NOW).unwrap();
        assert_eq!(
            event,
            ContractEvent::TokensLocked(TokensLocked {
                amount: 1000,
                until: NOW + DAY
            })
        );
        locker.lock(&token, &owner(), NOW + 2 * DAY, NOW).unwrap();
        assert_eq!(locker.unlock_date(), NOW + 2 * DAY);
    }

    #[test]
    fn test_lock_rejects_earlier_date() {
        let (mut locker, token) = setup(1000);
        locker.lock(&token, &owner(), NOW + 2 * DAY, NOW).unwrap();
        let result = locker.lock(&token, &owner(), NOW + DAY, NOW);
        assert_eq!(
            result,
            Err(LockerError::InvalidUnlockDate {
                requested: NOW + DAY,
                current: NOW + 2 * DAY
            })
        );
        assert!(locker.lock(&token, &owner(), NOW + 2 * DAY, NOW).is_err());
        assert_eq!(locker.unlock_date(), NOW + 2 * DAY);
    }

    #[test]
    fn test_lock_rejects_past_date() {
        let (mut locker, token) = setup(1000);
        assert!(locker.lock(&token, &owner(), NOW, NOW).is_err());
        assert!(locker.lock(&token, &owner(), NOW - 1, NOW).is_err());
        assert_eq!(locker.unlock_date(), EPOCH_ZERO);
    }

    #[test]
    fn test_lock_owner_only() {
        let (mut locker, token) = setup(1000);
        assert_eq!(
            locker.lock(&token, &eve(), NOW + DAY, NOW),
            Err(LockerError::Unauthorized)
        );
    }

    // ─── Share flag ───

    #[test]
    fn test_disable_share() {
        let (mut locker, token) = setup(1000);
        locker.disable_share(&owner()).unwrap();
        assert!(!locker.is_share_enabled());
        assert_eq!(
            locker.allocate_for(&token, &owner(), &user(), 1),
            Err(LockerError::SharingDisabled)
        );
    }

    #[test]
    fn test_disable_share_with_allocations() {
        let (mut locker, token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 10).unwrap();
        assert_eq!(
            locker.disable_share(&owner()),
            Err(LockerError::UsersStillAllocated { allocated: 10 })
        );
        assert!(locker.is_share_enabled());
    }

    // ─── Allocation ───

    #[test]
    fn test_allocate_then_over_allocate() {
        let (mut locker, token) = setup(1000);
        assert_eq!(locker.allocate_for(&token, &owner(), &user(), 500), Ok(500));
        assert_eq!(locker.user_balance(&user()), 500);
        assert_eq!(locker.total_users_balance(), 500);

        assert_eq!(
            locker.allocate_for(&token, &owner(), &eve(), 600),
            Err(LockerError::InsufficientOwnerBalance {
                requested: 600,
                available: 500
            })
        );
        assert_eq!(locker.total_users_balance(), 500);
    }

    #[test]
    fn test_allocate_to_owner_denied() {
        let (mut locker, token) = setup(1000);
        assert_eq!(
            locker.allocate_for(&token, &owner(), &owner(), 1),
            Err(LockerError::SelfAllocationDenied)
        );
    }

    #[test]
    fn test_allocate_accumulates() {
        let (mut locker, token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 100).unwrap();
        assert_eq!(locker.allocate_for(&token, &owner(), &user(), 50), Ok(150));
        assert_eq!(locker.owner_share(&token).unwrap(), 850);
    }

    // ─── Unlock ───

    #[test]
    fn test_unlock_for_before_date() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 500).unwrap();
        locker.lock(&token, &owner(), NOW + DAY, NOW).unwrap();
        assert_eq!(
            locker.unlock_for(&mut token, &user(), &user(), 100, NOW),
            Err(LockerError::TooEarly {
                unlock_date: NOW + DAY
            })
        );
    }

    #[test]
    fn test_unlock_for_after_date() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 500).unwrap();
        locker.lock(&token, &owner(), NOW + DAY, NOW).unwrap();
        let later = NOW + DAY;

        assert_eq!(
            locker.unlock_for(&mut token, &user(), &user(), 501, later),
            Err(LockerError::InsufficientUserBalance {
                requested: 501,
                balance: 500
            })
        );

        locker
            .unlock_for(&mut token, &user(), &user(), 200, later)
            .unwrap();
        assert_eq!(locker.user_balance(&user()), 300);
        assert_eq!(locker.total_users_balance(), 300);
        assert_eq!(token.balance_of(&user()), 200);
        assert_eq!(locker.asset_balance(&token).unwrap(), 800);
    }

    #[test]
    fn test_unlock_for_by_owner_and_stranger() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 500).unwrap();
        assert_eq!(
            locker.unlock_for(&mut token, &eve(), &user(), 1, NOW),
            Err(LockerError::AccessDenied)
        );
        locker
            .unlock_for(&mut token, &owner(), &user(), 1, NOW)
            .unwrap();
        assert_eq!(token.balance_of(&user()), 1);
    }

    #[test]
    fn test_unlock_for_zero_amount() {
        let (mut locker, mut token) = setup(1000);
        assert_eq!(
            locker.unlock_for(&mut token, &user(), &user(), 0, NOW),
            Err(LockerError::InvalidAmount)
        );
    }

    #[test]
    fn test_unlock_for_exceeds_contract_balance() {
        let (mut locker, mut token) = setup(1000);
        assert_eq!(
            locker.unlock_for(&mut token, &user(), &user(), 1001, NOW),
            Err(LockerError::InsufficientContractBalance {
                required: 1001,
                available: 1000
            })
        );
    }

    #[test]
    fn test_unlock_all() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 400).unwrap();
        locker.unlock_all(&mut token, &user(), NOW).unwrap();
        assert_eq!(locker.user_balance(&user()), 0);
        assert_eq!(token.balance_of(&user()), 400);

        assert_eq!(
            locker.unlock_all(&mut token, &user(), NOW),
            Err(LockerError::InvalidAmount)
        );
    }

    #[test]
    fn test_unlock_transfer_failure_rolls_back() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 400).unwrap();
        let events_before = locker.events().len();
        token.set_failing(true);
        assert_eq!(
            locker.unlock_for(&mut token, &user(), &user(), 100, NOW),
            Err(LockerError::TransferFailed)
        );
        assert_eq!(locker.user_balance(&user()), 400);
        assert_eq!(locker.total_users_balance(), 400);
        assert_eq!(locker.events().len(), events_before);
    }

    #[test]
    fn test_unlock_owner() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 300).unwrap();
        locker.lock(&token, &owner(), NOW + DAY, NOW).unwrap();

        assert!(matches!(
            locker.unlock_owner(&mut token, &owner(), NOW),
            Err(LockerError::TooEarly { .. })
        ));

        locker
            .unlock_owner(&mut token, &owner(), NOW + DAY)
            .unwrap();
        assert_eq!(token.balance_of(&owner()), 700);
        assert_eq!(locker.asset_balance(&token).unwrap(), 300);

        assert_eq!(
            locker.unlock_owner(&mut token, &owner(), NOW + DAY),
            Err(LockerError::ZeroOwnerBalance)
        );
    }

    // ─── Give up ───

    #[test]
    fn test_give_up_exact_balance() {
        let (mut locker, token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 300).unwrap();
        assert_eq!(locker.give_up(&user(), 300), Ok(0));
        assert_eq!(locker.total_users_balance(), 0);
        assert_eq!(locker.owner_share(&token).unwrap(), 1000);
    }

    #[test]
    fn test_give_up_partial_rejected() {
        let (mut locker, token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 300).unwrap();
        assert_eq!(
            locker.give_up(&user(), 299),
            Err(LockerError::InsufficientUserBalance {
                requested: 299,
                balance: 300
            })
        );
        assert_eq!(locker.user_balance(&user()), 300);
    }

    #[test]
    fn test_give_up_more_than_balance_rejected() {
        let (mut locker, token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 300).unwrap();
        assert!(matches!(
            locker.give_up(&user(), 301),
            Err(LockerError::InsufficientUserBalance { .. })
        ));
        assert_eq!(locker.total_users_balance(), 300);
    }

    #[test]
    fn test_give_up_without_balance() {
        let (mut locker, _) = setup(1000);
        assert_eq!(locker.give_up(&eve(), 0), Err(LockerError::AccessDenied));
        assert_eq!(locker.give_up_all(&eve()), Err(LockerError::AccessDenied));
    }

    #[test]
    fn test_give_up_all() {
        let (mut locker, token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 250).unwrap();
        assert_eq!(locker.give_up_all(&user()), Ok(0));
        assert!(matches!(
            locker.events().last(),
            Some(ContractEvent::TokensReturnedByUser(TokensReturnedByUser {
                amount: 250,
                new_balance: 0,
                ..
            }))
        ));
    }

    // ─── Burn ───

    #[test]
    fn test_burn_owner_tokens() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 400).unwrap();
        locker.burn_owner_tokens(&mut token, &owner(), 599).unwrap();
        assert_eq!(locker.asset_balance(&token).unwrap(), 401);
        assert_eq!(token.total_supply(), 401);
    }

    #[test]
    fn test_burn_requires_strictly_more() {
        let (mut locker, mut token) = setup(1000);
        locker.allocate_for(&token, &owner(), &user(), 400).unwrap();
        assert_eq!(
            locker.burn_owner_tokens(&mut token, &owner(), 600),
            Err(LockerError::InsufficientOwnerBalance {
                requested: 600,
                available: 600
            })
        );
    }

    #[test]
    fn test_burn_failure_surfaces_asset_error() {
        let (mut locker, mut token) = setup(1000);
        token.set_failing(true);
        assert!(matches!(
            locker.burn_owner_tokens(&mut token, &owner(), 1),
            Err(LockerError::Asset(_))
        ));
        assert!(locker.events().is_empty());
    }

    // ─── Ownership ───

    #[test]
    fn test_ownership_handoff() {
        let (mut locker, token) = setup(1000);
        locker.propose_owner(&owner(), user()).unwrap();
        locker.accept_ownership(&user()).unwrap();
        assert_eq!(locker.owner(), user());
        assert_eq!(
            locker.allocate_for(&token, &owner(), &eve(), 1),
            Err(LockerError::Unauthorized)
        );
    }

    #[test]
    fn test_events_json_export() {
        let (mut locker, token) = setup(1000);
        locker.lock(&token, &owner(), NOW + DAY, NOW).unwrap();
        locker.disable_share(&owner()).unwrap();
        let json = locker.events_json().unwrap();
        assert!(json.contains("\"ShareDisabled\""));
        let exported: Vec<ContractEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(exported.len(), 2);

        locker.drain_events();
        assert_eq!(locker.events_json().unwrap(), "[]");
    }

    #[test]
    fn test_wrong_asset_service() {
        let (mut locker, _) = setup(1000);
        let other = InMemoryAsset::new(Address::repeat_byte(0x71));
        assert!(matches!(
            locker.lock(&other, &owner(), NOW + DAY, NOW),
            Err(LockerError::InvalidAddress { .. })
        ));
    }
}
