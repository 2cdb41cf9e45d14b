//! Cross-chain registration storage: per-round slot tables and the chain
//! info each side-chain advertises when it registers.

use crate::StoreError;
use dpos_types::{BlockHash, ChainId, Timestamp};
use serde::{Deserialize, Serialize};

/// Registration info advertised by a side-chain.
///
/// Stored as an opaque bincode payload; the maintenance engine decodes it
/// when the chain wins a slot and treats decode failures as a per-chain
/// problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainInfo {
    pub chain_id: ChainId,
    /// First side-chain block this chain will relay headers from.
    pub begin_sync_height: u64,
    /// Hash of the block right before `begin_sync_height`.
    pub parent_block_hash: BlockHash,
    /// Time of the block at `begin_sync_height - 1`.
    pub block_time: Timestamp,
    /// The side-chain's own maintenance interval, in milliseconds.
    pub maintenance_time_interval: u64,
    /// Encoded signer list in effect at `block_time`.
    pub signer_list: Vec<u8>,
}

pub trait CrossChainStore {
    /// The slot table for `round`, `None` if the round was never assigned
    /// (or its table was deleted).
    fn slot_table(&self, round: u64) -> Result<Option<Vec<ChainId>>, StoreError>;
    fn put_slot_table(&self, round: u64, chains: &[ChainId]) -> Result<(), StoreError>;
    fn delete_slot_table(&self, round: u64) -> Result<(), StoreError>;

    /// Raw registration payload for `chain`, `None` if never registered.
    fn chain_info(&self, chain: &ChainId) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_chain_info(&self, chain: &ChainId, payload: &[u8]) -> Result<(), StoreError>;
}
