//! Side-chain header-sync checkpoints.

use crate::StoreError;
use dpos_types::{BlockHash, ChainId};
use serde::{Deserialize, Serialize};

/// The signer set authorised for a side-chain during one of its epochs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerListRecord {
    pub epoch: u64,
    /// Opaque encoded signer list, copied from the chain's registration info.
    pub signers: Vec<u8>,
}

pub trait CheckpointStore {
    /// Highest side-chain header number synced so far, `None` before the
    /// first checkpoint.
    fn latest_header_number(&self, chain: &ChainId) -> Result<Option<u64>, StoreError>;
    fn put_latest_header_number(&self, chain: &ChainId, number: u64) -> Result<(), StoreError>;

    fn latest_header_hash(&self, chain: &ChainId) -> Result<Option<BlockHash>, StoreError>;
    fn put_latest_header_hash(&self, chain: &ChainId, hash: &BlockHash)
        -> Result<(), StoreError>;

    fn signer_list(
        &self,
        chain: &ChainId,
        epoch: u64,
    ) -> Result<Option<SignerListRecord>, StoreError>;

    /// Store the signer list for `(chain, record.epoch)`, replacing any
    /// previous record for that pair.
    fn put_signer_list(&self, chain: &ChainId, record: &SignerListRecord)
        -> Result<(), StoreError>;
}
