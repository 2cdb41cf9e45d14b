//! LMDB implementation of WitnessStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{StoreError, WitnessRecord, WitnessStore};
use dpos_types::Address;

use crate::codec::{decode, encode};
use crate::txn::TxnScope;

pub struct LmdbWitnessStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) witnesses_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> WitnessStore for LmdbWitnessStore<S> {
    fn get_witness(&self, address: &Address) -> Result<Option<WitnessRecord>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.witnesses_db.get(txn, address.as_bytes())? {
                Some(bytes) => Ok(Some(decode(bytes)?)),
                None => Ok(None),
            }
        })?)
    }

    fn put_witness(&self, record: &WitnessRecord) -> Result<(), StoreError> {
        let val = encode(record)?;
        Ok(self.scope.write(|txn| {
            self.witnesses_db.put(txn, record.address.as_bytes(), &val)?;
            Ok(())
        })?)
    }

    fn iter_witnesses(&self) -> Result<Vec<WitnessRecord>, StoreError> {
        Ok(self.scope.read(|txn| {
            let mut results = Vec::new();
            for entry in self.witnesses_db.iter(txn)? {
                let (_, val) = entry?;
                results.push(decode(val)?);
            }
            Ok(results)
        })?)
    }
}
