//! Fixed-length witness / account address.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// Length in bytes of every account address (one prefix byte + 20-byte hash).
pub const ADDRESS_LEN: usize = 21;

/// An account address. Witnesses, voters and genesis delegates are all keyed
/// by this type.
///
/// Ordering is plain byte order, so `BTreeMap<Address, _>` iterates in the
/// same order on every node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Default network prefix byte.
    pub const PREFIX: u8 = 0x41;

    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address from a 20-byte body, prepending [`Address::PREFIX`].
    pub fn from_body(body: [u8; ADDRESS_LEN - 1]) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = Self::PREFIX;
        bytes[1..].copy_from_slice(&body);
        Self(bytes)
    }

    /// Parse an address from a byte slice of exactly [`ADDRESS_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            TypesError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Parse an address from its hex representation.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| TypesError::InvalidAddress(format!("{s}: {e}")))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
