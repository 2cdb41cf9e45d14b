//! Witness rotation: applies tallied vote deltas, lets the scheduler pick the
//! next active set, triggers reward distribution and persists active-flag
//! transitions.

use std::collections::BTreeSet;

use dpos_types::Address;

use crate::context::MaintenanceContext;
use crate::report::{MaintenanceIssue, MaintenanceReport};
use crate::vote_tally::VoteTally;
use crate::ConsensusError;

/// Apply `tally` and rotate the active witness set.
///
/// Callers skip this entirely when the tally is empty.
pub fn rotate_witnesses(
    ctx: &MaintenanceContext<'_>,
    tally: &VoteTally,
    report: &mut MaintenanceReport,
) -> Result<(), ConsensusError> {
    let stores = ctx.stores;
    let previous = stores.active.active_witnesses()?;
    let all = stores.witnesses.witness_addresses()?;

    let mut updated = 0usize;
    for (address, delta) in &tally.deltas {
        if *delta == 0 {
            continue;
        }
        let Some(mut witness) = stores.witnesses.get_witness(address)? else {
            tracing::warn!(%address, delta, "vote delta for unknown witness, skipping");
            report.issue(MaintenanceIssue::MissingWitness(*address));
            continue;
        };
        if !stores.accounts.account_exists(address)? {
            tracing::warn!(%address, delta, "witness has no backing account, skipping");
            report.issue(MaintenanceIssue::MissingAccount(*address));
            continue;
        }
        witness.vote_count = witness.vote_count.saturating_add(*delta);
        stores.witnesses.put_witness(&witness)?;
        updated += 1;
        tracing::debug!(%address, delta, vote_count = witness.vote_count, "applied vote delta");
    }

    let scheduled = ctx.services.scheduler.recompute_active_set(&all)?;
    stores.active.put_active_witnesses(&scheduled)?;
    ctx.services.incentive.distribute_rewards(&all)?;

    let current = stores.active.active_witnesses()?;
    let changed = !same_members(&previous, &current);
    if changed {
        update_active_flags(ctx, &previous, &current, report)?;
    }

    tracing::info!(
        before = ?previous,
        after = ?current,
        changed,
        vote_counts_updated = updated,
        "witness rotation finished"
    );

    report.vote_counts_updated = updated;
    report.witness_set_changed = changed;
    report.previous_active = Some(previous);
    report.new_active = Some(current);
    Ok(())
}

fn same_members(a: &[Address], b: &[Address]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// Every previous member is deactivated first, then every current member is
/// activated, so a witness present in both ends up active.
fn update_active_flags(
    ctx: &MaintenanceContext<'_>,
    previous: &[Address],
    current: &[Address],
    report: &mut MaintenanceReport,
) -> Result<(), ConsensusError> {
    for (addresses, active) in [(previous, false), (current, true)] {
        for address in addresses {
            match ctx.stores.witnesses.get_witness(address)? {
                Some(mut witness) => {
                    witness.is_active = active;
                    ctx.stores.witnesses.put_witness(&witness)?;
                }
                None => {
                    tracing::warn!(%address, active, "cannot update active flag of unknown witness");
                    report.issue(MaintenanceIssue::MissingWitness(*address));
                }
            }
        }
    }
    Ok(())
}
