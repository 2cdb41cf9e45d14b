//! Pending vote-delta ledger.
//!
//! Whenever a voter changes their allocation, the transaction pipeline writes
//! (or rewrites) one [`VotesRecord`] keyed by the voter. The record carries
//! the allocation that was in effect when the epoch started (`old_votes`) and
//! the allocation now requested (`new_votes`). The maintenance run consumes
//! the whole ledger at the next boundary.

use crate::StoreError;
use dpos_types::Address;
use serde::{Deserialize, Serialize};

/// A single (witness, count) allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub witness: Address,
    pub count: i64,
}

impl Vote {
    pub fn new(witness: Address, count: i64) -> Self {
        Self { witness, count }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotesRecord {
    pub voter: Address,
    pub old_votes: Vec<Vote>,
    pub new_votes: Vec<Vote>,
}

impl VotesRecord {
    pub fn new(voter: Address, old_votes: Vec<Vote>, new_votes: Vec<Vote>) -> Self {
        Self {
            voter,
            old_votes,
            new_votes,
        }
    }
}

pub trait VotesStore {
    fn put_votes(&self, record: &VotesRecord) -> Result<(), StoreError>;
    fn get_votes(&self, voter: &Address) -> Result<Option<VotesRecord>, StoreError>;
    fn votes_count(&self) -> Result<u64, StoreError>;

    /// Remove and return every pending record, in voter-address order.
    ///
    /// Contract: on `Ok`, the returned records are exactly the records that
    /// were present and the ledger is empty. On `Err`, the ledger must be
    /// left untouched (backends perform the read and the removal in one
    /// write transaction).
    fn drain_votes(&self) -> Result<Vec<VotesRecord>, StoreError>;
}
