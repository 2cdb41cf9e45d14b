//! LMDB implementation of ActiveWitnessStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{ActiveWitnessStore, StoreError};
use dpos_types::Address;

use crate::codec::{decode, encode};
use crate::txn::TxnScope;

const ACTIVE_KEY: &[u8] = b"active";

pub struct LmdbActiveWitnessStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) active_witnesses_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> ActiveWitnessStore for LmdbActiveWitnessStore<S> {
    fn active_witnesses(&self) -> Result<Vec<Address>, StoreError> {
        Ok(self
            .scope
            .read(|txn| match self.active_witnesses_db.get(txn, ACTIVE_KEY)? {
                Some(bytes) => decode(bytes),
                None => Ok(Vec::new()),
            })?)
    }

    fn put_active_witnesses(&self, witnesses: &[Address]) -> Result<(), StoreError> {
        let val = encode(&witnesses)?;
        Ok(self.scope.write(|txn| {
            self.active_witnesses_db.put(txn, ACTIVE_KEY, &val)?;
            Ok(())
        })?)
    }
}
