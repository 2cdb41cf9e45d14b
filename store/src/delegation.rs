//! Reward-cycle delegation bookkeeping.
//!
//! Each witness has a current brokerage (commission) rate. When the cycle
//! counter advances, the engine freezes every witness's brokerage and vote
//! weight under the new cycle number so rewards for that cycle can be
//! computed later from stable inputs.

use crate::StoreError;
use dpos_types::Address;
use serde::{Deserialize, Serialize};

/// Brokerage (percent) a witness keeps when it never set its own.
pub const DEFAULT_BROKERAGE: u8 = 20;

/// One row of the append-only per-cycle snapshot table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub brokerage: u8,
    pub vote_weight: i64,
}

pub trait DelegationStore {
    /// The witness's current brokerage, [`DEFAULT_BROKERAGE`] if never set.
    fn brokerage(&self, witness: &Address) -> Result<u8, StoreError>;
    fn put_brokerage(&self, witness: &Address, brokerage: u8) -> Result<(), StoreError>;

    fn put_cycle_snapshot(
        &self,
        cycle: u64,
        witness: &Address,
        snapshot: &CycleSnapshot,
    ) -> Result<(), StoreError>;

    fn get_cycle_snapshot(
        &self,
        cycle: u64,
        witness: &Address,
    ) -> Result<Option<CycleSnapshot>, StoreError>;
}
