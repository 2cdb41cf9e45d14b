//! Where a store's reads and writes land.
//!
//! A store opened straight from the environment runs every call in its own
//! transaction. A store opened from a [`LmdbWriteBatch`](crate::LmdbWriteBatch)
//! shares the batch's single write transaction, so nothing it writes is
//! visible to other readers until the batch commits.

use std::cell::RefCell;
use std::sync::Arc;

use heed::{Env, RoTxn, RwTxn};

use crate::LmdbError;

pub trait TxnScope {
    fn read<T>(&self, f: impl FnOnce(&RoTxn<'_>) -> Result<T, LmdbError>) -> Result<T, LmdbError>;

    fn write<T>(
        &self,
        f: impl FnOnce(&mut RwTxn<'_>) -> Result<T, LmdbError>,
    ) -> Result<T, LmdbError>;
}

/// One transaction per call, committed before returning.
impl TxnScope for Arc<Env> {
    fn read<T>(&self, f: impl FnOnce(&RoTxn<'_>) -> Result<T, LmdbError>) -> Result<T, LmdbError> {
        let rtxn = self.read_txn()?;
        f(&rtxn)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut RwTxn<'_>) -> Result<T, LmdbError>,
    ) -> Result<T, LmdbError> {
        let mut wtxn = self.write_txn()?;
        let out = f(&mut wtxn)?;
        wtxn.commit()?;
        Ok(out)
    }
}

/// The batch's open transaction. Reads see the batch's own uncommitted
/// writes; nothing is committed here.
impl TxnScope for &RefCell<RwTxn<'_>> {
    fn read<T>(&self, f: impl FnOnce(&RoTxn<'_>) -> Result<T, LmdbError>) -> Result<T, LmdbError> {
        let txn = self
            .try_borrow()
            .map_err(|_| LmdbError::Heed("batch transaction is already borrowed".into()))?;
        f(&txn)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut RwTxn<'_>) -> Result<T, LmdbError>,
    ) -> Result<T, LmdbError> {
        let mut txn = self
            .try_borrow_mut()
            .map_err(|_| LmdbError::Heed("batch transaction is already borrowed".into()))?;
        f(&mut txn)
    }
}
