//! Escrow: customer deposits, miner settlement, commission and refunds
//!
//! The escrow holds one pooled token balance on the asset service and splits
//! it, in its own books, into three pools:
//! - customers: funds deposited and not yet spent or refunded
//! - miners: funds earned by miners and not yet paid out
//! - commission: the platform's cut of every accountant transfer
//!
//! `customers + miners + commission` never exceeds the escrow's token balance
//! (equality holds unless someone sends tokens to the escrow directly).
//!
//! Every operation validates and computes all new values first, performs at
//! most one external call, and commits only after that call succeeds. A
//! failed operation leaves the books and the event log untouched.

use std::collections::HashMap;

use tracing::{debug, info, warn};
use types::fee::CommissionPolicy;
use types::ids::Address;
use types::numeric::Amount;

use crate::asset::AssetService;
use crate::config::EscrowConfig;
use crate::errors::EscrowError;
use crate::events::{
    AccountantChanged, AssetContractChanged, CommissionPercentChanged, ContractEvent, Deposit,
    EventLog, OwnershipProposed, OwnershipTransferred, Refund, Transfer,
};
use crate::security::{log_denied, AccessControl, Role};

const CONTRACT: &str = "escrow";

/// Escrow ledger and settlement protocol.
#[derive(Debug)]
pub struct Escrow {
    address: Address,
    access: AccessControl,
    /// `Address::ZERO` while unset
    asset_contract: Address,
    commission: CommissionPolicy,
    customer_balances: HashMap<Address, Amount>,
    miner_balances: HashMap<Address, Amount>,
    customers_total: Amount,
    miners_total: Amount,
    commission_total: Amount,
    events: EventLog,
}

impl Escrow {
    pub fn new(config: EscrowConfig) -> Self {
        info!(
            contract = CONTRACT,
            address = %config.address,
            owner = %config.owner,
            "escrow initialized"
        );
        Self {
            address: config.address,
            access: AccessControl::new(config.owner, config.accountant),
            asset_contract: config.asset_contract.unwrap_or(Address::ZERO),
            commission: config.commission,
            customer_balances: HashMap::new(),
            miner_balances: HashMap::new(),
            customers_total: 0,
            miners_total: 0,
            commission_total: 0,
            events: EventLog::new(),
        }
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Appoint a new accountant. Owner-only.
    pub fn set_accountant(
        &mut self,
        caller: &Address,
        accountant: Address,
    ) -> Result<ContractEvent, EscrowError> {
        let old = self.access.set_accountant(caller, accountant).ok_or_else(|| {
            log_denied(CONTRACT, Role::Owner, caller);
            EscrowError::Unauthorized
        })?;
        Ok(self.emit(ContractEvent::AccountantChanged(AccountantChanged {
            old,
            new: accountant,
        })))
    }

    /// Replace the commission policy. Owner-only.
    ///
    /// Fails with `InvalidPolicy` unless `mantissa / 10^scale < 100`.
    pub fn set_commission_policy(
        &mut self,
        caller: &Address,
        mantissa: u64,
        scale: u8,
    ) -> Result<ContractEvent, EscrowError> {
        self.require_owner(caller)?;
        let policy = CommissionPolicy::new(mantissa, scale)?;
        self.commission = policy;
        info!(
            contract = CONTRACT,
            mantissa,
            scale,
            percent = ?policy.percent(),
            "commission policy updated"
        );
        Ok(self.emit(ContractEvent::CommissionPercentChanged(
            CommissionPercentChanged { policy },
        )))
    }

    /// Point the escrow at a token contract. Owner-only.
    pub fn set_asset_contract(
        &mut self,
        caller: &Address,
        asset_contract: Address,
    ) -> Result<ContractEvent, EscrowError> {
        self.require_owner(caller)?;
        if asset_contract.is_zero() {
            return Err(EscrowError::InvalidAddress {
                reason: "asset contract cannot be the zero address".to_string(),
            });
        }
        let old = std::mem::replace(&mut self.asset_contract, asset_contract);
        Ok(self.emit(ContractEvent::AssetContractChanged(AssetContractChanged {
            old,
            new: asset_contract,
        })))
    }

    /// Start an ownership handoff. Owner-only.
    pub fn propose_owner(
        &mut self,
        caller: &Address,
        candidate: Address,
    ) -> Result<ContractEvent, EscrowError> {
        if candidate.is_zero() {
            return Err(EscrowError::InvalidAddress {
                reason: "owner cannot be the zero address".to_string(),
            });
        }
        if !self.access.ownership_mut().propose(caller, candidate) {
            log_denied(CONTRACT, Role::Owner, caller);
            return Err(EscrowError::Unauthorized);
        }
        Ok(self.emit(ContractEvent::OwnershipProposed(OwnershipProposed {
            owner: *caller,
            candidate,
        })))
    }

    /// Finish an ownership handoff. Only the proposed candidate may call.
    pub fn accept_ownership(&mut self, caller: &Address) -> Result<ContractEvent, EscrowError> {
        let old = self
            .access
            .ownership_mut()
            .accept(caller)
            .ok_or(EscrowError::Unauthorized)?;
        Ok(self.emit(ContractEvent::OwnershipTransferred(OwnershipTransferred {
            old,
            new: *caller,
        })))
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Pull `amount` tokens from `caller` into the escrow and credit the
    /// caller's customer balance.
    ///
    /// The caller must have approved the escrow on the asset service first.
    pub fn deposit(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        amount: Amount,
    ) -> Result<ContractEvent, EscrowError> {
        self.check_asset(asset)?;
        self.reject_self(caller, "escrow cannot deposit to itself")?;

        let new_balance = self
            .customer_balance(caller)
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        let new_total = self
            .customers_total
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;

        if !asset.transfer_from(&self.address, caller, &self.address, amount) {
            warn!(contract = CONTRACT, customer = %caller, amount, "deposit pull failed");
            return Err(EscrowError::TransferFailed);
        }

        self.customer_balances.insert(*caller, new_balance);
        self.customers_total = new_total;

        Ok(self.emit(ContractEvent::Deposit(Deposit {
            sender: *caller,
            amount,
        })))
    }

    /// Move `amount` from customer `from` to miner `to`, less commission.
    /// Accountant-only.
    ///
    /// Customers lose `amount`, the miner gains `amount - fee` and the
    /// commission pool gains `fee`, so the pooled sum is unchanged.
    pub fn transfer(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<ContractEvent, EscrowError> {
        self.require_accountant(caller)?;

        let balance = self.customer_balance(from);
        if balance == 0 {
            return Err(EscrowError::NoBalance);
        }
        if balance < amount {
            return Err(EscrowError::InsufficientBalance {
                required: amount,
                available: balance,
            });
        }

        let fee = self.commission.compute_fee(amount)?;
        let net = amount.checked_sub(fee).ok_or(EscrowError::Overflow)?;

        let new_commission_total = self
            .commission_total
            .checked_add(fee)
            .ok_or(EscrowError::Overflow)?;
        let new_customers_total = self
            .customers_total
            .checked_sub(amount)
            .ok_or(EscrowError::Overflow)?;
        let new_miner_balance = self
            .miner_balance(to)
            .checked_add(net)
            .ok_or(EscrowError::Overflow)?;
        let new_miners_total = self
            .miners_total
            .checked_add(net)
            .ok_or(EscrowError::Overflow)?;

        self.commission_total = new_commission_total;
        set_or_clear(&mut self.customer_balances, *from, balance - amount);
        self.customers_total = new_customers_total;
        self.miner_balances.insert(*to, new_miner_balance);
        self.miners_total = new_miners_total;

        debug!(contract = CONTRACT, from = %from, to = %to, amount, fee, "settled to miner");
        Ok(self.emit(ContractEvent::Transfer(Transfer {
            from: *from,
            to: *to,
            amount,
        })))
    }

    /// Pay a customer's whole balance back to them. Accountant-only.
    pub fn refund(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        customer: &Address,
    ) -> Result<ContractEvent, EscrowError> {
        self.require_accountant(caller)?;

        let balance = self.customer_balance(customer);
        if balance == 0 {
            return Err(EscrowError::NoBalance);
        }
        let new_total = self
            .customers_total
            .checked_sub(balance)
            .ok_or(EscrowError::Overflow)?;

        self.push_transfer(asset, customer, balance)?;

        self.customers_total = new_total;
        self.customer_balances.remove(customer);

        Ok(self.emit(ContractEvent::Refund(Refund {
            customer: *customer,
            amount: balance,
        })))
    }

    /// Withdraw accrued commission. Owner-only.
    pub fn transfer_commission(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.require_owner(caller)?;
        if amount > self.commission_total {
            return Err(EscrowError::InsufficientCommission {
                required: amount,
                available: self.commission_total,
            });
        }

        self.push_transfer(asset, to, amount)?;

        self.commission_total -= amount;
        info!(
            contract = CONTRACT,
            to = %to,
            amount,
            remaining = self.commission_total,
            "commission withdrawn"
        );
        Ok(())
    }

    /// Pay out `amount` of the caller's own miner balance to `to`.
    /// Miner-only.
    pub fn transfer_to_miner(
        &mut self,
        asset: &mut dyn AssetService,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        let balance = self.miner_balance(caller);
        if balance == 0 {
            log_denied(CONTRACT, Role::Miner, caller);
            return Err(EscrowError::Unauthorized);
        }
        if amount > balance {
            return Err(EscrowError::InsufficientBalance {
                required: amount,
                available: balance,
            });
        }
        let new_total = self
            .miners_total
            .checked_sub(amount)
            .ok_or(EscrowError::Overflow)?;

        self.push_transfer(asset, to, amount)?;

        set_or_clear(&mut self.miner_balances, *caller, balance - amount);
        self.miners_total = new_total;
        info!(contract = CONTRACT, miner = %caller, to = %to, amount, "miner paid out");
        Ok(())
    }

    /// Send `amount` of the escrow's tokens to `to`.
    ///
    /// Requires a configured asset contract, a recipient other than the
    /// escrow and `0 < amount <= held balance`.
    fn push_transfer(
        &self,
        asset: &mut dyn AssetService,
        to: &Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.check_asset(asset)?;
        self.reject_self(to, "escrow cannot pay out to itself")?;
        let held = asset.balance_of(&self.address);
        if amount == 0 || amount > held {
            return Err(EscrowError::InvalidAmount);
        }
        if !asset.transfer(&self.address, to, amount) {
            warn!(contract = CONTRACT, to = %to, amount, held, "payout transfer failed");
            return Err(EscrowError::TransferFailed);
        }
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Tokens the escrow holds on the asset service.
    pub fn total_asset_balance(&self, asset: &dyn AssetService) -> Result<Amount, EscrowError> {
        self.check_asset(asset)?;
        Ok(asset.balance_of(&self.address))
    }

    pub fn customers_total(&self) -> Amount {
        self.customers_total
    }

    pub fn miners_total(&self) -> Amount {
        self.miners_total
    }

    pub fn commission_total(&self) -> Amount {
        self.commission_total
    }

    /// `customers + miners + commission`.
    pub fn tracked_total(&self) -> Amount {
        // Bounded by the held token balance, which is itself an Amount.
        self.customers_total
            .saturating_add(self.miners_total)
            .saturating_add(self.commission_total)
    }

    pub fn customer_balance(&self, customer: &Address) -> Amount {
        self.customer_balances.get(customer).copied().unwrap_or(0)
    }

    pub fn miner_balance(&self, miner: &Address) -> Amount {
        self.miner_balances.get(miner).copied().unwrap_or(0)
    }

    /// Non-zero customer balances.
    pub fn customer_balances(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.customer_balances.iter()
    }

    /// Non-zero miner balances.
    pub fn miner_balances(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.miner_balances.iter()
    }

    pub fn commission_policy(&self) -> CommissionPolicy {
        self.commission
    }

    pub fn accountant(&self) -> Address {
        self.access.accountant()
    }

    pub fn owner(&self) -> Address {
        self.access.ownership().owner()
    }

    pub fn pending_owner(&self) -> Option<Address> {
        self.access.ownership().pending()
    }

    pub fn asset_contract(&self) -> Option<Address> {
        (!self.asset_contract.is_zero()).then_some(self.asset_contract)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Verify the pooled totals are covered by the held token balance.
    pub fn check_conservation(&self, asset: &dyn AssetService) -> Result<(), EscrowError> {
        let held = self.total_asset_balance(asset)?;
        let tracked = self.tracked_total();
        debug!(contract = CONTRACT, tracked, held, "conservation check");
        if tracked > held {
            return Err(EscrowError::ConservationViolated { tracked, held });
        }
        Ok(())
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

    fn require_owner(&self, caller: &Address) -> Result<(), EscrowError> {
        if !self.access.is_owner(caller) {
            log_denied(CONTRACT, Role::Owner, caller);
            return Err(EscrowError::Unauthorized);
        }
        Ok(())
    }

    fn require_accountant(&self, caller: &Address) -> Result<(), EscrowError> {
        if !self.access.is_accountant(caller) {
            log_denied(CONTRACT, Role::Accountant, caller);
            return Err(EscrowError::Unauthorized);
        }
        Ok(())
    }

    // A token move between the escrow and itself leaves the held balance
    // unchanged, so the pools would drift from it.
    fn reject_self(&self, party: &Address, reason: &str) -> Result<(), EscrowError> {
        if *party == self.address {
            warn!(contract = CONTRACT, party = %party, "self-referencing token move");
            return Err(EscrowError::InvalidAddress {
                reason: reason.to_string(),
            });
        }
        Ok(())
    }

    /// The asset service handed in must be the configured token contract.
    fn check_asset(&self, asset: &dyn AssetService) -> Result<(), EscrowError> {
        if self.asset_contract.is_zero() || asset.contract_address() != self.asset_contract {
            return Err(EscrowError::NotConfigured);
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
