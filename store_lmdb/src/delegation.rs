//! LMDB implementation of DelegationStore.
//!
//! Cycle snapshots are keyed `cycle (u64 BE) ‖ witness address`, so all rows
//! of one cycle are contiguous.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dpos_store::{CycleSnapshot, DelegationStore, StoreError, DEFAULT_BROKERAGE};
use dpos_types::{Address, ADDRESS_LEN};

use crate::codec::{decode, encode};
use crate::txn::TxnScope;
use crate::LmdbError;

pub struct LmdbDelegationStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) brokerage_db: Database<Bytes, Bytes>,
    pub(crate) cycle_snapshots_db: Database<Bytes, Bytes>,
}

fn snapshot_key(cycle: u64, witness: &Address) -> [u8; 8 + ADDRESS_LEN] {
    let mut key = [0u8; 8 + ADDRESS_LEN];
    key[..8].copy_from_slice(&cycle.to_be_bytes());
    key[8..].copy_from_slice(witness.as_bytes());
    key
}

impl<S: TxnScope> LmdbDelegationStore<S> {
    /// All snapshot rows written for `cycle`, in witness-address order.
    pub fn cycle_snapshots(&self, cycle: u64) -> Result<Vec<(Address, CycleSnapshot)>, StoreError> {
        Ok(self.scope.read(|txn| {
            let mut results = Vec::new();
            for entry in self.cycle_snapshots_db.prefix_iter(txn, &cycle.to_be_bytes())? {
                let (key, val) = entry?;
                let witness = Address::from_slice(&key[8..])
                    .map_err(|e| LmdbError::Corruption(e.to_string()))?;
                results.push((witness, decode(val)?));
            }
            Ok(results)
        })?)
    }
}

impl<S: TxnScope> DelegationStore for LmdbDelegationStore<S> {
    fn brokerage(&self, witness: &Address) -> Result<u8, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.brokerage_db.get(txn, witness.as_bytes())? {
                Some([rate]) => Ok(*rate),
                Some(other) => Err(LmdbError::Serialization(format!(
                    "brokerage: expected 1 byte, got {}",
                    other.len()
                ))),
                None => Ok(DEFAULT_BROKERAGE),
            }
        })?)
    }

    fn put_brokerage(&self, witness: &Address, brokerage: u8) -> Result<(), StoreError> {
        Ok(self.scope.write(|txn| {
            self.brokerage_db.put(txn, witness.as_bytes(), &[brokerage])?;
            Ok(())
        })?)
    }

    fn put_cycle_snapshot(
        &self,
        cycle: u64,
        witness: &Address,
        snapshot: &CycleSnapshot,
    ) -> Result<(), StoreError> {
        let val = encode(snapshot)?;
        Ok(self.scope.write(|txn| {
            self.cycle_snapshots_db
                .put(txn, &snapshot_key(cycle, witness), &val)?;
            Ok(())
        })?)
    }

    fn get_cycle_snapshot(
        &self,
        cycle: u64,
        witness: &Address,
    ) -> Result<Option<CycleSnapshot>, StoreError> {
        Ok(self.scope.read(|txn| {
            match self.cycle_snapshots_db.get(txn, &snapshot_key(cycle, witness))? {
                Some(bytes) => Ok(Some(decode(bytes)?)),
                None => Ok(None),
            }
        })?)
    }
}
