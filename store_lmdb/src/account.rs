//! LMDB implementation of AccountStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{AccountRecord, AccountStore, StoreError};
use dpos_types::Address;

use crate::codec::{decode, encode};
use crate::txn::TxnScope;

pub struct LmdbAccountStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> AccountStore for LmdbAccountStore<S> {
    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let val = encode(record)?;
        Ok(self.scope.write(|txn| {
            self.accounts_db.put(txn, record.address.as_bytes(), &val)?;
            Ok(())
        })?)
    }

    fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.accounts_db.get(txn, address.as_bytes())? {
                Some(bytes) => Ok(Some(decode(bytes)?)),
                None => Ok(None),
            }
        })?)
    }

    fn account_exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self
            .scope
            .read(|txn| Ok(self.accounts_db.get(txn, address.as_bytes())?.is_some()))?)
    }
}
