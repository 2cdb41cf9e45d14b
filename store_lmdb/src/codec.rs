//! Value and key encoding shared by the store implementations.
//!
//! Records are `bincode`-encoded. Integer key components are big-endian so
//! LMDB's byte ordering matches numeric ordering.

use serde::de::DeserializeOwned;
use serde::Serialize;

use dpos_types::ChainId;

use crate::LmdbError;

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

pub(crate) fn decode_u64(bytes: &[u8], what: &str) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization(format!("{what}: expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

/// `len (u16 BE) ‖ chain id ‖ suffix`. The length prefix keeps one chain's
/// keys from running into another's when one id is a prefix of the other.
pub(crate) fn chain_key(chain: &ChainId, suffix: &[u8]) -> Vec<u8> {
    let id = chain.as_str().as_bytes();
    let mut key = Vec::with_capacity(2 + id.len() + suffix.len());
    key.extend_from_slice(&(id.len() as u16).to_be_bytes());
    key.extend_from_slice(id);
    key.extend_from_slice(suffix);
    key
}
