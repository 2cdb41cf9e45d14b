//! Block references consumed by the maintenance engine.
//!
//! The engine never looks inside a block body; it only needs the sequence
//! number, the timestamp and a hash to hand to the finality layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Timestamp, TypesError};

/// A 32-byte block hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHash([u8; 32]);

impl Default for BlockHash {
    fn default() -> Self {
        Self::ZERO
    }
}

impl BlockHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            TypesError::InvalidBlockHash(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash(")?;
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "\u{2026})")
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The header fields of a block being applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Sequence number; the network's first block after genesis is `1`.
    pub number: u64,
    /// Block production time.
    pub timestamp: Timestamp,
    pub hash: BlockHash,
}

impl BlockHeader {
    pub fn new(number: u64, timestamp: Timestamp, hash: BlockHash) -> Self {
        Self {
            number,
            timestamp,
            hash,
        }
    }

    /// Whether this is the first block produced after genesis.
    pub fn is_first(&self) -> bool {
        self.number == 1
    }
}
