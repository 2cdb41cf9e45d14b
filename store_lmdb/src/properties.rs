//! LMDB implementation of PropertiesStore.
//!
//! Each property is one key in the `properties` database. Absent keys read
//! as the property's zero value.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};
use serde::de::DeserializeOwned;
use serde::Serialize;

use dpos_store::{GenesisPowerFlag, PropertiesStore, StoreError};
use dpos_types::Timestamp;

use crate::codec::{decode, encode};
use crate::txn::TxnScope;

const NEXT_MAINTENANCE_TIME: &[u8] = b"next_maintenance_time";
const BEFORE_MAINTENANCE_TIME: &[u8] = b"before_maintenance_time";
const CURRENT_CYCLE_NUMBER: &[u8] = b"current_cycle_number";
const ALLOW_CHANGE_DELEGATION: &[u8] = b"allow_change_delegation";
const GENESIS_POWER_FLAG: &[u8] = b"remove_the_power_of_the_gr";
const LATEST_BLOCK_HEADER_TIMESTAMP: &[u8] = b"latest_block_header_timestamp";
const STATE_FLAG: &[u8] = b"state_flag";

pub struct LmdbPropertiesStore<S = Arc<Env>> {
    pub(crate) scope: S,
    pub(crate) properties_db: Database<Bytes, Bytes>,
}

impl<S: TxnScope> LmdbPropertiesStore<S> {
    fn get<T: DeserializeOwned + Default>(&self, key: &[u8]) -> Result<T, StoreError> {
        Ok(self.scope.read(|txn| match self.properties_db.get(txn, key)? {
            Some(bytes) => decode(bytes),
            None => Ok(T::default()),
        })?)
    }

    fn put<T: Serialize>(&self, key: &[u8], value: &T) -> Result<(), StoreError> {
        let val = encode(value)?;
        Ok(self.scope.write(|txn| {
            self.properties_db.put(txn, key, &val)?;
            Ok(())
        })?)
    }
}

impl<S: TxnScope> PropertiesStore for LmdbPropertiesStore<S> {
    fn next_maintenance_time(&self) -> Result<Timestamp, StoreError> {
        self.get(NEXT_MAINTENANCE_TIME)
    }

    fn put_next_maintenance_time(&self, time: Timestamp) -> Result<(), StoreError> {
        self.put(NEXT_MAINTENANCE_TIME, &time)
    }

    fn before_maintenance_time(&self) -> Result<Timestamp, StoreError> {
        self.get(BEFORE_MAINTENANCE_TIME)
    }

    fn put_before_maintenance_time(&self, time: Timestamp) -> Result<(), StoreError> {
        self.put(BEFORE_MAINTENANCE_TIME, &time)
    }

    fn current_cycle_number(&self) -> Result<u64, StoreError> {
        self.get(CURRENT_CYCLE_NUMBER)
    }

    fn put_current_cycle_number(&self, cycle: u64) -> Result<(), StoreError> {
        self.put(CURRENT_CYCLE_NUMBER, &cycle)
    }

    fn allow_change_delegation(&self) -> Result<bool, StoreError> {
        self.get(ALLOW_CHANGE_DELEGATION)
    }

    fn put_allow_change_delegation(&self, allowed: bool) -> Result<(), StoreError> {
        self.put(ALLOW_CHANGE_DELEGATION, &allowed)
    }

    fn genesis_power_flag(&self) -> Result<GenesisPowerFlag, StoreError> {
        let code: i64 = self.get(GENESIS_POWER_FLAG)?;
        Ok(GenesisPowerFlag::from_code(code))
    }

    fn put_genesis_power_flag(&self, flag: GenesisPowerFlag) -> Result<(), StoreError> {
        self.put(GENESIS_POWER_FLAG, &flag.code())
    }

    fn latest_block_header_timestamp(&self) -> Result<Timestamp, StoreError> {
        self.get(LATEST_BLOCK_HEADER_TIMESTAMP)
    }

    fn put_latest_block_header_timestamp(&self, time: Timestamp) -> Result<(), StoreError> {
        self.put(LATEST_BLOCK_HEADER_TIMESTAMP, &time)
    }

    fn state_flag(&self) -> Result<bool, StoreError> {
        self.get(STATE_FLAG)
    }

    fn put_state_flag(&self, maintenance_ran: bool) -> Result<(), StoreError> {
        self.put(STATE_FLAG, &maintenance_ran)
    }
}
