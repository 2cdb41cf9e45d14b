//! Dynamic chain properties consulted and updated by the maintenance engine.
//!
//! Absent properties read as their zero value (`0`, `false`,
//! [`GenesisPowerFlag::Inactive`]); genesis bootstrap writes the real
//! initial values.

use crate::StoreError;
use dpos_types::Timestamp;

/// State of the one-shot genesis power removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenesisPowerFlag {
    /// Removal has not been requested.
    Inactive,
    /// Removal is requested and will run on the next maintenance boundary.
    Armed,
    /// Removal already ran. Terminal.
    Consumed,
}

impl GenesisPowerFlag {
    /// Persisted integer encoding (`0`, `1`, `-1`).
    pub fn code(self) -> i64 {
        match self {
            Self::Inactive => 0,
            Self::Armed => 1,
            Self::Consumed => -1,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Armed,
            -1 => Self::Consumed,
            _ => Self::Inactive,
        }
    }
}

pub trait PropertiesStore {
    fn next_maintenance_time(&self) -> Result<Timestamp, StoreError>;
    fn put_next_maintenance_time(&self, time: Timestamp) -> Result<(), StoreError>;

    /// Boundary time of the maintenance run that most recently completed.
    fn before_maintenance_time(&self) -> Result<Timestamp, StoreError>;
    fn put_before_maintenance_time(&self, time: Timestamp) -> Result<(), StoreError>;

    fn current_cycle_number(&self) -> Result<u64, StoreError>;
    fn put_current_cycle_number(&self, cycle: u64) -> Result<(), StoreError>;

    /// Gate for cycle advancement (`DelegationCycleAdvancer`).
    fn allow_change_delegation(&self) -> Result<bool, StoreError>;
    fn put_allow_change_delegation(&self, allowed: bool) -> Result<(), StoreError>;

    fn genesis_power_flag(&self) -> Result<GenesisPowerFlag, StoreError>;
    fn put_genesis_power_flag(&self, flag: GenesisPowerFlag) -> Result<(), StoreError>;

    /// Timestamp of the latest applied block header. Written by the block
    /// pipeline before the maintenance engine runs.
    fn latest_block_header_timestamp(&self) -> Result<Timestamp, StoreError>;
    fn put_latest_block_header_timestamp(&self, time: Timestamp) -> Result<(), StoreError>;

    /// Whether maintenance ran while applying the latest block.
    fn state_flag(&self) -> Result<bool, StoreError>;
    fn put_state_flag(&self, maintenance_ran: bool) -> Result<(), StoreError>;
}
