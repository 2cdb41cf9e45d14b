//! Block-scoped write batch: every store write made while applying one block
//! goes into a single LMDB write transaction.
//!
//! # Usage
//!
//! ```ignore
//! let batch = env.write_batch()?;
//! {
//!     let stores = batch.stores();
//!     stores.properties.put_latest_block_header_timestamp(time)?;
//!     stores.votes.drain_votes()?;
//! }
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`LmdbWriteBatch::commit`], all
//! writes are rolled back (the underlying LMDB transaction is aborted).

use std::cell::RefCell;

use heed::RwTxn;

use crate::environment::{LmdbEnvironment, LmdbStores};
use crate::LmdbError;

/// Stores opened on a batch share its transaction.
pub type BatchStores<'b, 'e> = LmdbStores<&'b RefCell<RwTxn<'e>>>;

pub struct LmdbWriteBatch<'e> {
    txn: RefCell<RwTxn<'e>>,
    env: &'e LmdbEnvironment,
}

impl<'e> LmdbWriteBatch<'e> {
    pub(crate) fn new(env: &'e LmdbEnvironment) -> Result<Self, LmdbError> {
        let txn = env.env_ref().write_txn()?;
        Ok(Self {
            txn: RefCell::new(txn),
            env,
        })
    }

    /// Every store, reading and writing through this batch.
    pub fn stores(&self) -> BatchStores<'_, 'e> {
        self.env.stores_in(&self.txn)
    }

    /// Commit every write made through [`Self::stores`].
    pub fn commit(self) -> Result<(), LmdbError> {
        self.txn.into_inner().commit()?;
        Ok(())
    }
}
