//! LMDB implementation of VotesStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{StoreError, VotesRecord, VotesStore};
use dpos_types::Address;

use crate::codec::{decode, encode};
use crate::txn::TxnScope;

pub struct LmdbVotesStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) votes_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> VotesStore for LmdbVotesStore<S> {
    fn put_votes(&self, record: &VotesRecord) -> Result<(), StoreError> {
        let val = encode(record)?;
        Ok(self.scope.write(|txn| {
            self.votes_db.put(txn, record.voter.as_bytes(), &val)?;
            Ok(())
        })?)
    }

    fn get_votes(&self, voter: &Address) -> Result<Option<VotesRecord>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.votes_db.get(txn, voter.as_bytes())? {
                Some(bytes) => Ok(Some(decode(bytes)?)),
                None => Ok(None),
            }
        })?)
    }

    fn votes_count(&self) -> Result<u64, StoreError> {
        Ok(self.scope.read(|txn| Ok(self.votes_db.len(txn)?))?)
    }

    /// Reads and clears the ledger inside one write transaction. Any error
    /// leaves the transaction's ledger untouched.
    fn drain_votes(&self) -> Result<Vec<VotesRecord>, StoreError> {
        if self.votes_count()? == 0 {
            return Ok(Vec::new());
        }

        let records = self.scope.write(|txn| {
            let mut records = Vec::new();
            for entry in self.votes_db.iter(&*txn)? {
                let (_, val) = entry?;
                records.push(decode::<VotesRecord>(val)?);
            }
            self.votes_db.clear(txn)?;
            Ok(records)
        })?;

        tracing::debug!(records = records.len(), "vote ledger drained");
        Ok(records)
    }
}
