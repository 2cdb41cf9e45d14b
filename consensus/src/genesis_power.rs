//! One-shot removal of the bootstrap vote weight granted to genesis
//! witnesses.
//!
//! When the persisted flag is [`GenesisPowerFlag::Armed`], every genesis
//! witness loses exactly its genesis allocation and the flag moves to
//! [`GenesisPowerFlag::Consumed`]. Consumed is terminal, so later runs leave
//! vote counts alone.

use dpos_store::GenesisPowerFlag;

use crate::context::MaintenanceContext;
use crate::report::{MaintenanceIssue, MaintenanceReport};
use crate::ConsensusError;

/// Returns `true` if the revocation ran during this call.
pub fn revoke_genesis_power(
    ctx: &MaintenanceContext<'_>,
    report: &mut MaintenanceReport,
) -> Result<bool, ConsensusError> {
    let properties = ctx.stores.properties;
    if properties.genesis_power_flag()? != GenesisPowerFlag::Armed {
        return Ok(false);
    }

    for genesis in ctx.genesis_witnesses {
        let Some(mut witness) = ctx.stores.witnesses.get_witness(&genesis.address)? else {
            tracing::warn!(address = %genesis.address, "genesis witness record missing, skipping power removal");
            report.issue(MaintenanceIssue::MissingWitness(genesis.address));
            continue;
        };
        witness.vote_count = witness.vote_count.saturating_sub(genesis.vote_count);
        ctx.stores.witnesses.put_witness(&witness)?;
        tracing::debug!(
            address = %witness.address,
            removed = genesis.vote_count,
            vote_count = witness.vote_count,
            "removed genesis vote weight"
        );
    }

    properties.put_genesis_power_flag(GenesisPowerFlag::Consumed)?;
    tracing::info!(witnesses = ctx.genesis_witnesses.len(), "genesis witness power removed");
    Ok(true)
}
