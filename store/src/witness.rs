//! Witness (delegate) storage trait.

use crate::StoreError;
use dpos_types::Address;
use serde::{Deserialize, Serialize};

/// A registered witness. Records are never deleted; a witness that drops out
/// of the active set stays here with `is_active == false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessRecord {
    pub address: Address,
    /// Accumulated vote weight. Signed: the engine applies negative deltas
    /// without clamping.
    pub vote_count: i64,
    /// Whether the witness is in the current active (block-producing) set.
    pub is_active: bool,
    #[serde(default)]
    pub url: String,
}

impl WitnessRecord {
    pub fn new(address: Address, vote_count: i64) -> Self {
        Self {
            address,
            vote_count,
            is_active: false,
            url: String::new(),
        }
    }
}

pub trait WitnessStore {
    fn get_witness(&self, address: &Address) -> Result<Option<WitnessRecord>, StoreError>;
    fn put_witness(&self, record: &WitnessRecord) -> Result<(), StoreError>;

    /// All registered witnesses, active or not, in address order.
    fn iter_witnesses(&self) -> Result<Vec<WitnessRecord>, StoreError>;

    /// Addresses of all registered witnesses, in address order.
    fn witness_addresses(&self) -> Result<Vec<Address>, StoreError> {
        Ok(self
            .iter_witnesses()?
            .into_iter()
            .map(|w| w.address)
            .collect())
    }
}
