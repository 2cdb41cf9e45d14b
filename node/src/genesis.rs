//! Seeding an empty store from the genesis witness list.

use dpos_consensus::ConsensusStores;
use dpos_store::{AccountRecord, GenesisPowerFlag, MetaStore, WitnessRecord};
use dpos_types::{GenesisWitness, Timestamp};

use crate::tracing_spans::genesis_span;
use crate::NodeError;

/// Meta key marking a store as bootstrapped.
pub const GENESIS_MARKER_KEY: &str = "genesis_initialized";

/// Chain parameters written at bootstrap.
#[derive(Clone, Debug, Default)]
pub struct GenesisSettings {
    pub witnesses: Vec<GenesisWitness>,
    pub allow_change_delegation: bool,
    /// Arm the one-shot genesis power revocation.
    pub remove_genesis_power: bool,
}

/// Write the genesis state into an empty store.
///
/// Every genesis witness gets a witness record carrying its genesis vote
/// count, marked active, plus a backing account. The genesis witnesses
/// become the active set in declaration order and the first boundary is
/// left at time zero, so the first block schedules the first real epoch.
///
/// Returns `false` without writing anything if the store was already
/// bootstrapped.
pub fn bootstrap_genesis(
    stores: ConsensusStores<'_>,
    meta: &dyn MetaStore,
    settings: &GenesisSettings,
) -> Result<bool, NodeError> {
    if meta.get_meta(GENESIS_MARKER_KEY)?.is_some() {
        tracing::debug!("store already bootstrapped");
        return Ok(false);
    }
    let _span = genesis_span(settings.witnesses.len()).entered();

    for genesis in &settings.witnesses {
        let mut witness = WitnessRecord::new(genesis.address, genesis.vote_count);
        witness.is_active = true;
        witness.url = genesis.url.clone();
        stores.witnesses.put_witness(&witness)?;
        stores.accounts.put_account(&AccountRecord {
            address: genesis.address,
            name: genesis.url.clone(),
            created_at: Timestamp::EPOCH,
        })?;
    }

    let active: Vec<_> = settings.witnesses.iter().map(|w| w.address).collect();
    stores.active.put_active_witnesses(&active)?;

    let properties = stores.properties;
    properties.put_next_maintenance_time(Timestamp::EPOCH)?;
    properties.put_before_maintenance_time(Timestamp::EPOCH)?;
    properties.put_current_cycle_number(0)?;
    properties.put_allow_change_delegation(settings.allow_change_delegation)?;
    let flag = if settings.remove_genesis_power {
        GenesisPowerFlag::Armed
    } else {
        GenesisPowerFlag::Inactive
    };
    properties.put_genesis_power_flag(flag)?;

    meta.put_meta(GENESIS_MARKER_KEY, &[1])?;
    tracing::info!(
        witnesses = active.len(),
        remove_genesis_power = settings.remove_genesis_power,
        "genesis state written"
    );
    Ok(true)
}
