//! Delegation cycle bookkeeping.

use dpos_store::CycleSnapshot;

use crate::context::MaintenanceContext;
use crate::ConsensusError;

/// Advance the reward-accounting cycle and snapshot every witness under the
/// new cycle number.
///
/// Returns the new cycle, or `None` when delegation changes are disabled.
/// Each snapshot copies the witness's own current brokerage forward, along
/// with its vote count as it stands after rotation.
pub fn advance_cycle(ctx: &MaintenanceContext<'_>) -> Result<Option<u64>, ConsensusError> {
    let stores = ctx.stores;
    if !stores.properties.allow_change_delegation()? {
        tracing::debug!("delegation changes disabled, cycle not advanced");
        return Ok(None);
    }

    let next_cycle = stores.properties.current_cycle_number()?.saturating_add(1);
    stores.properties.put_current_cycle_number(next_cycle)?;

    let witnesses = stores.witnesses.iter_witnesses()?;
    for witness in &witnesses {
        let snapshot = CycleSnapshot {
            brokerage: stores.delegation.brokerage(&witness.address)?,
            vote_weight: witness.vote_count,
        };
        stores
            .delegation
            .put_cycle_snapshot(next_cycle, &witness.address, &snapshot)?;
    }

    tracing::info!(cycle = next_cycle, witnesses = witnesses.len(), "delegation cycle advanced");
    Ok(Some(next_cycle))
}
