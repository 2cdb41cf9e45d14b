//! Active witness set storage trait.

use crate::StoreError;
use dpos_types::Address;

/// Persists the ordered list of witnesses currently allowed to produce
/// blocks. The order is the production schedule; membership is what the
/// maintenance engine compares.
pub trait ActiveWitnessStore {
    fn active_witnesses(&self) -> Result<Vec<Address>, StoreError>;
    fn put_active_witnesses(&self, witnesses: &[Address]) -> Result<(), StoreError>;
}
