//! LMDB implementation of CrossChainStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{CrossChainStore, StoreError};
use dpos_types::ChainId;

use crate::codec::{decode, encode};
use crate::txn::TxnScope;

pub struct LmdbCrossChainStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) slot_tables_db: Database<Bytes, Bytes>,
    pub(crate) chain_info_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> CrossChainStore for LmdbCrossChainStore<S> {
    fn slot_table(&self, round: u64) -> Result<Option<Vec<ChainId>>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.slot_tables_db.get(txn, &round.to_be_bytes())? {
                Some(bytes) => Ok(Some(decode(bytes)?)),
                None => Ok(None),
            }
        })?)
    }

    fn put_slot_table(&self, round: u64, chains: &[ChainId]) -> Result<(), StoreError> {
        let val = encode(&chains)?;
        Ok(self.scope.write(|txn| {
            self.slot_tables_db.put(txn, &round.to_be_bytes(), &val)?;
            Ok(())
        })?)
    }

    fn delete_slot_table(&self, round: u64) -> Result<(), StoreError> {
        Ok(self.scope.write(|txn| {
            self.slot_tables_db.delete(txn, &round.to_be_bytes())?;
            Ok(())
        })?)
    }

    fn chain_info(&self, chain: &ChainId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.scope.read(|txn| {
            Ok(self
                .chain_info_db
                .get(txn, chain.as_str().as_bytes())?
                .map(<[u8]>::to_vec))
        })?)
    }

    fn put_chain_info(&self, chain: &ChainId, payload: &[u8]) -> Result<(), StoreError> {
        Ok(self.scope.write(|txn| {
            self.chain_info_db.put(txn, chain.as_str().as_bytes(), payload)?;
            Ok(())
        })?)
    }
}
