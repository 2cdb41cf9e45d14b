//! Per-block entry point.
//!
//! [`MaintenanceManager::apply_block`] is called once for every applied
//! block, in block order. It decides whether the block crosses the
//! maintenance boundary, runs the maintenance cycle if so, moves the
//! boundary forward and notifies the finality layer.

use dpos_types::{Address, BlockHeader, Timestamp};
use serde::Serialize;

use crate::context::MaintenanceContext;
use crate::maintenance::do_maintenance;
use crate::report::MaintenanceReport;
use crate::ConsensusError;

/// Engine state carried from one block to the next.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceState {
    pub next_maintenance_time: Timestamp,
    pub before_maintenance_time: Timestamp,
    /// Active set captured just before the last maintenance run.
    pub before_witness: Vec<Address>,
    /// Active set captured just after the last maintenance run.
    pub current_witness: Vec<Address>,
    /// Whether the last applied block crossed the boundary.
    pub boundary_crossed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlockOutcome {
    pub boundary_crossed: bool,
    /// Present only when maintenance actually ran. The first block can cross
    /// the boundary without running it.
    pub report: Option<MaintenanceReport>,
    pub state: MaintenanceState,
}

impl BlockOutcome {
    pub fn maintenance_ran(&self) -> bool {
        self.report.is_some()
    }
}

#[derive(Default)]
pub struct MaintenanceManager {
    state: MaintenanceState,
}

impl MaintenanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted boundary and active set, e.g. after a restart.
    pub fn init(&mut self, ctx: &MaintenanceContext<'_>) -> Result<(), ConsensusError> {
        let properties = ctx.stores.properties;
        let active = ctx.stores.active.active_witnesses()?;
        self.state = MaintenanceState {
            next_maintenance_time: properties.next_maintenance_time()?,
            before_maintenance_time: properties.before_maintenance_time()?,
            before_witness: active.clone(),
            current_witness: active,
            boundary_crossed: properties.state_flag()?,
        };
        tracing::debug!(
            next_maintenance_time = %self.state.next_maintenance_time,
            active = self.state.current_witness.len(),
            "maintenance manager initialised"
        );
        Ok(())
    }

    pub fn state(&self) -> &MaintenanceState {
        &self.state
    }

    /// Put back a state taken from [`Self::state`], for when the caller had
    /// to discard the store writes of a block that applied cleanly here.
    pub fn restore(&mut self, state: MaintenanceState) {
        self.state = state;
    }

    /// Apply one block.
    ///
    /// The next boundary is checked before anything is written, so a
    /// schedule that would move it backwards fails the block with the store
    /// untouched. On any later error the in-memory state is left as it was
    /// before the call; the caller is expected to discard the block's store
    /// writes.
    pub fn apply_block(
        &mut self,
        ctx: &MaintenanceContext<'_>,
        block: &BlockHeader,
    ) -> Result<BlockOutcome, ConsensusError> {
        let properties = ctx.stores.properties;
        let block_time = block.timestamp;
        let current_next = properties.next_maintenance_time()?;
        let boundary = current_next <= block_time;
        let run = boundary && !block.is_first();

        let next = ctx
            .services
            .schedule
            .next_maintenance_time(current_next, block_time);
        if next < current_next || (boundary && next <= block_time) {
            return Err(ConsensusError::ScheduleRegression {
                current: current_next,
                next,
                block_time,
            });
        }

        let mut state = self.state.clone();
        let mut report = None;
        if run {
            let _span = tracing::info_span!("maintenance", block = block.number).entered();
            state.before_witness = ctx.stores.active.active_witnesses()?;
            properties.put_before_maintenance_time(current_next)?;
            state.before_maintenance_time = current_next;
            report = Some(do_maintenance(ctx)?);
            state.current_witness = ctx.stores.active.active_witnesses()?;
        }

        properties.put_next_maintenance_time(next)?;
        properties.put_state_flag(boundary)?;
        state.next_maintenance_time = next;
        state.boundary_crossed = boundary;

        if run {
            tracing::info!(
                block = block.number,
                next_maintenance_time = %next,
                witnesses = state.current_witness.len(),
                "witness set scheduled for next epoch"
            );
            ctx.services
                .finality
                .witness_set_pre_prepare(block, &state.current_witness, next);
        }
        let announced = if block.is_first() { next } else { current_next };
        ctx.services.finality.block_pre_prepare(block, announced);

        self.state = state.clone();
        Ok(BlockOutcome {
            boundary_crossed: boundary,
            report,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::MaintenanceSchedule;
    use crate::context::{Collaborators, ConsensusStores};
    use crate::test_support::{addr, block, FinalityEvent, Harness, SchedulerWithStore, INTERVAL};
    use dpos_store::{
        ActiveWitnessStore, PropertiesStore, Vote, VotesRecord, VotesStore, WitnessStore,
    };

    fn apply(h: &Harness, manager: &mut MaintenanceManager, number: u64, time: u64) -> BlockOutcome {
        h.with_ctx(|ctx| manager.apply_block(ctx, &block(number, time)))
            .unwrap()
    }

    fn started(h: &Harness, next: u64) -> MaintenanceManager {
        h.store
            .put_next_maintenance_time(Timestamp::new(next))
            .unwrap();
        let mut manager = MaintenanceManager::new();
        h.with_ctx(|ctx| manager.init(ctx)).unwrap();
        manager
    }

    #[test]
    fn init_loads_persisted_state() {
        let h = Harness::new().with_witnesses(&[(addr(1), 1)], &[addr(1)]);
        let manager = started(&h, 42);
        assert_eq!(manager.state().next_maintenance_time, Timestamp::new(42));
        assert_eq!(manager.state().current_witness, vec![addr(1)]);
    }

    #[test]
    fn first_block_only_schedules_boundary() {
        let h = Harness::new().with_witnesses(&[(addr(1), 1)], &[addr(1)]);
        let mut manager = started(&h, 0);

        let outcome = apply(&h, &mut manager, 1, 1_000);

        assert!(outcome.boundary_crossed);
        assert!(!outcome.maintenance_ran());
        assert_eq!(outcome.state.next_maintenance_time, Timestamp::new(INTERVAL));
        assert_eq!(
            *h.finality.events.borrow(),
            vec![FinalityEvent::Block {
                block: 1,
                next: Timestamp::new(INTERVAL)
            }]
        );
        assert!(h.store.state_flag().unwrap());
    }

    #[test]
    fn block_before_boundary_changes_nothing() {
        let h = Harness::new().with_witnesses(&[(addr(1), 1)], &[addr(1)]);
        let mut manager = started(&h, INTERVAL);

        let outcome = apply(&h, &mut manager, 5, INTERVAL - 1);

        assert!(!outcome.boundary_crossed);
        assert_eq!(h.store.next_maintenance_time().unwrap(), Timestamp::new(INTERVAL));
        assert!(!h.store.state_flag().unwrap());
        assert_eq!(
            *h.finality.events.borrow(),
            vec![FinalityEvent::Block {
                block: 5,
                next: Timestamp::new(INTERVAL)
            }]
        );
    }

    #[test]
    fn boundary_block_runs_maintenance_then_notifies() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10), (addr(2), 5)], &[addr(1)]);
        h.store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(2), 50)]))
            .unwrap();
        h.scheduler.will_return(vec![addr(2)]);
        let mut manager = started(&h, INTERVAL);

        let outcome = apply(&h, &mut manager, 9, INTERVAL + 3);

        let report = outcome.report.expect("maintenance ran");
        assert!(report.witness_set_changed);
        assert_eq!(outcome.state.before_witness, vec![addr(1)]);
        assert_eq!(outcome.state.current_witness, vec![addr(2)]);
        assert_eq!(outcome.state.before_maintenance_time, Timestamp::new(INTERVAL));
        assert_eq!(outcome.state.next_maintenance_time, Timestamp::new(2 * INTERVAL));
        assert_eq!(
            h.store.before_maintenance_time().unwrap(),
            Timestamp::new(INTERVAL)
        );
        assert_eq!(
            *h.finality.events.borrow(),
            vec![
                FinalityEvent::WitnessSet {
                    block: 9,
                    witnesses: vec![addr(2)],
                    next: Timestamp::new(2 * INTERVAL),
                },
                FinalityEvent::Block {
                    block: 9,
                    next: Timestamp::new(INTERVAL),
                },
            ]
        );
        assert_eq!(manager.state(), &outcome.state);
    }

    #[test]
    fn each_boundary_runs_once() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10)], &[addr(1)]);
        let mut manager = started(&h, INTERVAL);

        assert!(apply(&h, &mut manager, 2, INTERVAL).maintenance_ran());
        assert!(!apply(&h, &mut manager, 3, INTERVAL + 1).maintenance_ran());
        // several idle intervals later
        let outcome = apply(&h, &mut manager, 4, 5 * INTERVAL + 7);
        assert!(outcome.maintenance_ran());
        assert_eq!(outcome.state.next_maintenance_time, Timestamp::new(6 * INTERVAL));
    }

    #[test]
    fn storage_failure_keeps_previous_state() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10)], &[addr(1)]);
        h.store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(1), 1)]))
            .unwrap();
        let mut manager = started(&h, INTERVAL);
        let before = manager.state().clone();
        h.store.fail_writes(true);

        let result = h.with_ctx(|ctx| manager.apply_block(ctx, &block(2, INTERVAL)));

        assert!(matches!(result, Err(ConsensusError::Store(_))));
        assert_eq!(manager.state(), &before);
        assert!(h.finality.events.borrow().is_empty());
        h.store.fail_writes(false);
        assert_eq!(h.store.votes_count().unwrap(), 1);
    }

    struct Backwards;

    impl MaintenanceSchedule for Backwards {
        fn next_maintenance_time(&self, current: Timestamp, _block_time: Timestamp) -> Timestamp {
            Timestamp::new(current.as_millis().saturating_sub(1))
        }
    }

    fn with_schedule<R>(
        h: &Harness,
        schedule: &dyn MaintenanceSchedule,
        f: impl FnOnce(&MaintenanceContext<'_>) -> R,
    ) -> R {
        let scheduler = SchedulerWithStore {
            script: &h.scheduler,
            store: &h.store,
        };
        let ctx = MaintenanceContext::new(
            ConsensusStores::from_backend(&h.store),
            Collaborators {
                scheduler: &scheduler,
                incentive: &h.incentive,
                auctions: &h.auctions,
                eligibility: &h.auctions,
                finality: &h.finality,
                schedule,
            },
            &h.genesis,
        );
        f(&ctx)
    }

    #[test]
    fn regressing_schedule_is_rejected() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10)], &[addr(1)]);
        let mut manager = started(&h, INTERVAL);

        let result = with_schedule(&h, &Backwards, |ctx| manager.apply_block(ctx, &block(2, 10)));

        assert!(matches!(result, Err(ConsensusError::ScheduleRegression { .. })));
        assert_eq!(h.store.next_maintenance_time().unwrap(), Timestamp::new(INTERVAL));
    }

    #[test]
    fn regressing_schedule_at_boundary_writes_nothing() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10), (addr(2), 5)], &[addr(1)]);
        h.store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(2), 50)]))
            .unwrap();
        h.scheduler.will_return(vec![addr(2)]);
        let mut manager = started(&h, INTERVAL);
        let writes = h.store.write_count();

        let result = with_schedule(&h, &Backwards, |ctx| {
            manager.apply_block(ctx, &block(2, INTERVAL + 5))
        });

        assert!(matches!(result, Err(ConsensusError::ScheduleRegression { .. })));
        assert_eq!(h.store.write_count(), writes);
        assert_eq!(h.store.votes_count().unwrap(), 1);
        assert_eq!(h.store.active_witnesses().unwrap(), vec![addr(1)]);
        assert!(h.scheduler.calls.borrow().is_empty());
        assert!(h.incentive.calls.borrow().is_empty());
        assert!(h.finality.events.borrow().is_empty());
    }

    #[test]
    fn failed_block_in_batch_can_be_retried() {
        let h = Harness::new().with_witnesses(&[(addr(1), 10), (addr(2), 5)], &[addr(1)]);
        h.store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(2), 50)]))
            .unwrap();
        h.scheduler.will_return(vec![addr(2)]);
        let mut manager = started(&h, INTERVAL);
        let before = manager.state().clone();

        h.incentive.failing.set(true);
        {
            let batch = h.store.begin_batch();
            let result =
                h.with_ctx_on(batch.store(), |ctx| manager.apply_block(ctx, &block(2, INTERVAL)));
            assert!(matches!(result, Err(ConsensusError::Collaborator { .. })));
            // dropped uncommitted
        }
        assert_eq!(manager.state(), &before);
        assert_eq!(h.store.votes_count().unwrap(), 1);
        assert_eq!(h.store.get_witness(&addr(2)).unwrap().unwrap().vote_count, 5);
        assert_eq!(h.store.active_witnesses().unwrap(), vec![addr(1)]);

        h.incentive.failing.set(false);
        let batch = h.store.begin_batch();
        let outcome = h
            .with_ctx_on(batch.store(), |ctx| manager.apply_block(ctx, &block(2, INTERVAL)))
            .unwrap();
        batch.commit().unwrap();

        assert!(outcome.report.expect("maintenance ran").witness_set_changed);
        assert_eq!(h.store.votes_count().unwrap(), 0);
        assert_eq!(h.store.get_witness(&addr(2)).unwrap().unwrap().vote_count, 55);
        assert!(h.store.get_witness(&addr(2)).unwrap().unwrap().is_active);
        assert!(!h.store.get_witness(&addr(1)).unwrap().unwrap().is_active);
        assert_eq!(h.store.active_witnesses().unwrap(), vec![addr(2)]);
    }
}
