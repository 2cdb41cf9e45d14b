//! Genesis witness allocation.

use serde::{Deserialize, Serialize};

use crate::Address;

/// A witness declared in the genesis block together with the bootstrap vote
/// weight it was granted.
///
/// The genesis-power revoker subtracts exactly `vote_count` from the stored
/// witness record once the network decides to remove bootstrap weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisWitness {
    pub address: Address,
    pub vote_count: i64,
    #[serde(default)]
    pub url: String,
}

impl GenesisWitness {
    pub fn new(address: Address, vote_count: i64) -> Self {
        Self {
            address,
            vote_count,
            url: String::new(),
        }
    }
}
