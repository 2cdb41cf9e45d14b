//! Account storage trait.
//!
//! The maintenance engine only needs to know whether the account behind a
//! witness still exists; balances and permissions live elsewhere.

use crate::StoreError;
use dpos_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub address: Address,
    #[serde(default)]
    pub name: String,
    pub created_at: Timestamp,
}

pub trait AccountStore {
    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError>;
    fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError>;

    fn account_exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.get_account(address)?.is_some())
    }
}
