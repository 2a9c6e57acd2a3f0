//! Commission policy
//!
//! The commission is a fixed-point percentage `mantissa / 10^scale`. A policy
//! of `{ mantissa: 20, scale: 1 }` is 2.0%.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::TypesError;
use crate::numeric::Amount;

/// Fixed-point commission percentage
///
/// Always strictly below 100%. Construct through [`CommissionPolicy::new`] so
/// that bound is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy")]
pub struct CommissionPolicy {
    mantissa: u64,
    scale: u8,
}

#[derive(Deserialize)]
struct RawPolicy {
    mantissa: u64,
    scale: u8,
}

impl TryFrom<RawPolicy> for CommissionPolicy {
    type Error = TypesError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        CommissionPolicy::new(raw.mantissa, raw.scale)
    }
}

impl CommissionPolicy {
    /// No commission
    pub const ZERO: CommissionPolicy = CommissionPolicy {
        mantissa: 0,
        scale: 0,
    };

    /// Validate and build a policy. Fails if `mantissa / 10^scale >= 100`.
    pub fn new(mantissa: u64, scale: u8) -> Result<Self, TypesError> {
        // 10^scale beyond u128 means the quotient is zero
        let whole_percent = match 10u128.checked_pow(u32::from(scale)) {
            Some(divisor) => u128::from(mantissa) / divisor,
            None => 0,
        };
        if whole_percent >= 100 {
            return Err(TypesError::InvalidPolicy { mantissa, scale });
        }
        Ok(Self { mantissa, scale })
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Fee owed on `amount`.
    ///
    /// `floor(floor(amount * mantissa / 10^scale) / 100)`: multiply first, then
    /// two floor divisions in that order.
    pub fn compute_fee(&self, amount: Amount) -> Result<Amount, TypesError> {
        let scaled = amount
            .checked_mul(u128::from(self.mantissa))
            .ok_or(TypesError::Overflow)?;
        let per_cent = match 10u128.checked_pow(u32::from(self.scale)) {
            Some(divisor) => scaled / divisor,
            None => 0,
        };
        Ok(per_cent / 100)
    }

    /// Percentage as a decimal, e.g. `2.0` for `{20, 1}`.
    ///
    /// `None` when the scale is beyond what `Decimal` can represent.
    pub fn percent(&self) -> Option<Decimal> {
        Decimal::try_from_i128_with_scale(i128::from(self.mantissa), u32::from(self.scale)).ok()
    }
}
