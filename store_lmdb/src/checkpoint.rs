//! LMDB implementation of CheckpointStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{CheckpointStore, SignerListRecord, StoreError};
use dpos_types::{BlockHash, ChainId};

use crate::codec::{chain_key, decode, decode_u64, encode};
use crate::txn::TxnScope;
use crate::LmdbError;

pub struct LmdbCheckpointStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) header_nums_db: Database<Bytes, Bytes>,
    pub(crate) header_hashes_db: Database<Bytes, Bytes>,
    pub(crate) signer_lists_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> CheckpointStore for LmdbCheckpointStore<S> {
    fn latest_header_number(&self, chain: &ChainId) -> Result<Option<u64>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.header_nums_db.get(txn, &chain_key(chain, &[]))? {
                Some(bytes) => Ok(Some(decode_u64(bytes, "header number")?)),
                None => Ok(None),
            }
        })?)
    }

    fn put_latest_header_number(&self, chain: &ChainId, number: u64) -> Result<(), StoreError> {
        Ok(self.scope.write(|txn| {
            self.header_nums_db
                .put(txn, &chain_key(chain, &[]), &number.to_be_bytes())?;
            Ok(())
        })?)
    }

    fn latest_header_hash(&self, chain: &ChainId) -> Result<Option<BlockHash>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.header_hashes_db.get(txn, &chain_key(chain, &[]))? {
                Some(bytes) => Ok(Some(
                    BlockHash::from_slice(bytes)
                        .map_err(|e| LmdbError::Corruption(e.to_string()))?,
                )),
                None => Ok(None),
            }
        })?)
    }

    fn put_latest_header_hash(
        &self,
        chain: &ChainId,
        hash: &BlockHash,
    ) -> Result<(), StoreError> {
        Ok(self.scope.write(|txn| {
            self.header_hashes_db
                .put(txn, &chain_key(chain, &[]), hash.as_bytes())?;
            Ok(())
        })?)
    }

    fn signer_list(
        &self,
        chain: &ChainId,
        epoch: u64,
    ) -> Result<Option<SignerListRecord>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self
                .signer_lists_db
                .get(txn, &chain_key(chain, &epoch.to_be_bytes()))?
            {
                Some(bytes) => Ok(Some(decode(bytes)?)),
                None => Ok(None),
            }
        })?)
    }

    fn put_signer_list(
        &self,
        chain: &ChainId,
        record: &SignerListRecord,
    ) -> Result<(), StoreError> {
        let val = encode(record)?;
        Ok(self.scope.write(|txn| {
            self.signer_lists_db
                .put(txn, &chain_key(chain, &record.epoch.to_be_bytes()), &val)?;
            Ok(())
        })?)
    }
}
