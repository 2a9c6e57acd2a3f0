//! Account identifiers
//!
//! Every participant (customers, miners, the owner, the accountant and the
//! contracts themselves) is identified by a 20-byte address. The text form is
//! `0x` followed by 40 hex digits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::TypesError;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// 20-byte account address
///
/// `Address::ZERO` doubles as the "not configured" sentinel for optional
/// contract references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Address with every byte set to `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; ADDRESS_LEN])
    }

    /// Parse a `0x`-prefixed (or bare) 40-digit hex string
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(TypesError::InvalidAddress {
                reason: format!("expected {} hex digits, got {}", ADDRESS_LEN * 2, digits.len()),
            });
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| TypesError::InvalidAddress {
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}
