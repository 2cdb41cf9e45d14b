//! One maintenance run, executed when a block crosses the boundary.

use crate::context::MaintenanceContext;
use crate::cross_chain::CrossChainEpochRotator;
use crate::cycle::advance_cycle;
use crate::genesis_power::revoke_genesis_power;
use crate::report::MaintenanceReport;
use crate::rotation::rotate_witnesses;
use crate::vote_tally::tally_votes;
use crate::ConsensusError;

/// Run every maintenance step in order: genesis power revocation, vote
/// tally, witness rotation (only when the tally is non-empty), cycle advance
/// and cross-chain rotation.
///
/// Any storage error aborts the run; item-scoped problems are collected in
/// the returned report.
pub fn do_maintenance(ctx: &MaintenanceContext<'_>) -> Result<MaintenanceReport, ConsensusError> {
    let mut report = MaintenanceReport::default();

    let revoked = revoke_genesis_power(ctx, &mut report)?;
    report.genesis_power_revoked = revoked;

    let tally = tally_votes(ctx.stores.votes)?;
    report.votes_consumed = tally.records;
    report.tallied_witnesses = tally.deltas.len();
    if tally.is_empty() {
        tracing::debug!("no vote changes this epoch, witness set kept");
    } else {
        rotate_witnesses(ctx, &tally, &mut report)?;
    }

    report.cycle_advanced_to = advance_cycle(ctx)?;
    CrossChainEpochRotator::new(ctx).rotate(&mut report)?;

    tracing::info!(
        votes = report.votes_consumed,
        witness_set_changed = report.witness_set_changed,
        cycle = ?report.cycle_advanced_to,
        issues = report.issues.len(),
        "maintenance finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::AuctionRound;
    use crate::test_support::{addr, Harness};
    use dpos_store::{
        CrossChainStore, GenesisPowerFlag, PropertiesStore, Vote, VotesRecord, VotesStore,
        WitnessStore,
    };
    use dpos_types::{ChainId, GenesisWitness, Timestamp};

    #[test]
    fn empty_ledger_skips_rotation_but_runs_cycle_and_cross_chain() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10)], &[addr(1)]);
        h.store.put_allow_change_delegation(true).unwrap();
        h.store
            .put_latest_block_header_timestamp(Timestamp::new(2_000))
            .unwrap();
        h.auctions.rounds.borrow_mut().push(AuctionRound {
            round: 3,
            end_time: Timestamp::new(1_000),
            duration: 5_000,
            slot_count: 1,
        });
        h.auctions
            .eligible
            .borrow_mut()
            .insert(3, vec![ChainId::new("x")]);

        let report = h.with_ctx(do_maintenance).unwrap();

        assert!(!report.rotation_ran());
        assert!(h.scheduler.calls.borrow().is_empty());
        assert!(h.incentive.calls.borrow().is_empty());
        assert_eq!(report.cycle_advanced_to, Some(1));
        assert_eq!(h.store.slot_table(3).unwrap(), Some(vec![ChainId::new("x")]));
    }

    #[test]
    fn full_run_applies_genesis_removal_before_deltas() {
        let mut h = Harness::new().with_witnesses(&[(addr(1), 1_000), (addr(2), 500)], &[addr(1)]);
        h.genesis = vec![GenesisWitness::new(addr(1), 100)];
        h.store
            .put_genesis_power_flag(GenesisPowerFlag::Armed)
            .unwrap();
        h.store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(2), 700)]))
            .unwrap();
        h.scheduler.will_return(vec![addr(2)]);

        let report = h.with_ctx(do_maintenance).unwrap();

        assert!(report.genesis_power_revoked);
        assert_eq!(report.votes_consumed, 1);
        assert!(report.witness_set_changed);
        assert_eq!(h.store.get_witness(&addr(1)).unwrap().unwrap().vote_count, 900);
        assert_eq!(h.store.get_witness(&addr(2)).unwrap().unwrap().vote_count, 1_200);
        assert!(h.store.get_witness(&addr(2)).unwrap().unwrap().is_active);
        assert!(!h.store.get_witness(&addr(1)).unwrap().unwrap().is_active);
        assert_eq!(h.store.votes_count().unwrap(), 0);
        assert_eq!(report.cycle_advanced_to, None);
    }

    #[test]
    fn storage_failure_aborts_run() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10)], &[addr(1)]);
        h.store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(1), 1)]))
            .unwrap();
        h.store.fail_writes(true);

        assert!(matches!(
            h.with_ctx(do_maintenance),
            Err(ConsensusError::Store(_))
        ));
        h.store.fail_writes(false);
        assert_eq!(h.store.votes_count().unwrap(), 1);
    }
}
