//! Contract-specific error types
//!
//! Error taxonomy for the escrow, token-locker and asset-service boundaries.
//! Every contract error carries a stable reason code (`code()`) so callers can
//! match on failures without parsing display strings.

use thiserror::Error;
use types::errors::TypesError;
use types::numeric::{Amount, Timestamp};

/// Failures reported by the external asset service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Asset balance too low: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Allowance too low: required {required}, available {available}")]
    InsufficientAllowance { required: Amount, available: Amount },

    #[error("Asset service rejected the call")]
    Rejected,

    #[error("Arithmetic overflow in asset balance")]
    Overflow,
}

/// Escrow-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Unauthorized: caller lacks the required role")]
    Unauthorized,

    #[error("Asset contract is not configured")]
    NotConfigured,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Customer has no balance")]
    NoBalance,

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Insufficient commission: required {required}, available {available}")]
    InsufficientCommission { required: Amount, available: Amount },

    #[error("Invalid commission policy: {mantissa}e-{scale} percent")]
    InvalidPolicy { mantissa: u64, scale: u8 },

    #[error("Asset transfer failed")]
    TransferFailed,

    #[error("Pooled balances exceed held assets: tracked {tracked}, held {held}")]
    ConservationViolated { tracked: Amount, held: Amount },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

impl EscrowError {
    /// Short machine-checkable reason code
    pub fn code(&self) -> &'static str {
        match self {
            EscrowError::Unauthorized => "UNAUTHORIZED",
            EscrowError::NotConfigured => "NOT_CONFIGURED",
            EscrowError::InvalidAmount => "INVALID_AMOUNT",
            EscrowError::InvalidAddress { .. } => "INVALID_ADDRESS",
            EscrowError::NoBalance => "NO_BALANCE",
            EscrowError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EscrowError::InsufficientCommission { .. } => "INSUFFICIENT_COMMISSION",
            EscrowError::InvalidPolicy { .. } => "INVALID_POLICY",
            EscrowError::TransferFailed => "TRANSFER_FAILED",
            EscrowError::ConservationViolated { .. } => "CONSERVATION_VIOLATED",
            EscrowError::Overflow => "OVERFLOW",
        }
    }
}

impl From<TypesError> for EscrowError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::InvalidPolicy { mantissa, scale } => {
                EscrowError::InvalidPolicy { mantissa, scale }
            }
            TypesError::InvalidAddress { reason } => EscrowError::InvalidAddress { reason },
            TypesError::Overflow => EscrowError::Overflow,
        }
    }
}

/// Token-locker-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockerError {
    #[error("Unauthorized: caller is not the owner")]
    Unauthorized,

    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid unlock date {requested}: must be after {current} and in the future")]
    InvalidUnlockDate { requested: Timestamp, current: Timestamp },

    #[error("Tokens are locked until {unlock_date}")]
    TooEarly { unlock_date: Timestamp },

    #[error("Owner has no unallocated tokens")]
    ZeroOwnerBalance,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Insufficient contract balance: required {required}, available {available}")]
    InsufficientContractBalance { required: Amount, available: Amount },

    #[error("Insufficient user balance: requested {requested}, balance {balance}")]
    InsufficientUserBalance { requested: Amount, balance: Amount },

    #[error("Insufficient owner balance: requested {requested}, available {available}")]
    InsufficientOwnerBalance { requested: Amount, available: Amount },

    #[error("Owner cannot allocate tokens to itself")]
    SelfAllocationDenied,

    #[error("Users still hold allocations: {allocated}")]
    UsersStillAllocated { allocated: Amount },

    #[error("Sharing is disabled")]
    SharingDisabled,

    #[error("Asset transfer failed")]
    TransferFailed,

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

impl LockerError {
    /// Short machine-checkable reason code
    pub fn code(&self) -> &'static str {
        match self {
            LockerError::Unauthorized => "UNAUTHORIZED",
            LockerError::AccessDenied => "ACCESS_DENIED",
            LockerError::InvalidAddress { .. } => "INVALID_ADDRESS",
            LockerError::InvalidUnlockDate { .. } => "INVALID_UNLOCK_DATE",
            LockerError::TooEarly { .. } => "TOO_EARLY",
            LockerError::ZeroOwnerBalance => "ZERO_OWNER_BALANCE",
            LockerError::InvalidAmount => "INVALID_AMOUNT",
            LockerError::InsufficientContractBalance { .. } => "INSUFFICIENT_CONTRACT_BALANCE",
            LockerError::InsufficientUserBalance { .. } => "INSUFFICIENT_USER_BALANCE",
            LockerError::InsufficientOwnerBalance { .. } => "INSUFFICIENT_OWNER_BALANCE",
            LockerError::SelfAllocationDenied => "SELF_ALLOCATION_DENIED",
            LockerError::UsersStillAllocated { .. } => "USERS_STILL_ALLOCATED",
            LockerError::SharingDisabled => "SHARING_DISABLED",
            LockerError::TransferFailed => "TRANSFER_FAILED",
            LockerError::Asset(_) => "ASSET_ERROR",
            LockerError::Overflow => "OVERFLOW",
        }
    }
}
