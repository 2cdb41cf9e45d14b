//! Scripted collaborators and a ready-made harness for engine tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use dpos_nullables::NullStore;
use dpos_store::{ActiveWitnessStore, WitnessRecord};
use dpos_types::{Address, BlockHash, BlockHeader, ChainId, GenesisWitness, Timestamp};

use crate::collaborators::{
    AuctionRound, AuctionRoundSource, ChainEligibility, FinalityNotifier, IncentiveDistributor,
    WitnessScheduler,
};
use crate::context::{Collaborators, ConsensusStores, MaintenanceContext};
use crate::schedule::IntervalSchedule;
use crate::ConsensusError;

pub const INTERVAL: u64 = 6 * 60 * 60 * 1000;

pub fn addr(n: u8) -> Address {
    Address::from_body([n; 20])
}

pub fn block(number: u64, time: u64) -> BlockHeader {
    BlockHeader::new(number, Timestamp::new(time), BlockHash::new([number as u8; 32]))
}

/// Returns whatever active set the test scripted; when nothing is scripted,
/// keeps the current active set.
#[derive(Default)]
pub struct ScriptedScheduler {
    pub next: RefCell<Option<Vec<Address>>>,
    pub calls: RefCell<Vec<Vec<Address>>>,
}

impl ScriptedScheduler {
    pub fn will_return(&self, set: Vec<Address>) {
        *self.next.borrow_mut() = Some(set);
    }
}

pub struct SchedulerWithStore<'a> {
    pub script: &'a ScriptedScheduler,
    pub store: &'a NullStore,
}

impl WitnessScheduler for SchedulerWithStore<'_> {
    fn recompute_active_set(
        &self,
        all_witnesses: &[Address],
    ) -> Result<Vec<Address>, ConsensusError> {
        self.script.calls.borrow_mut().push(all_witnesses.to_vec());
        match self.script.next.borrow().clone() {
            Some(set) => Ok(set),
            None => Ok(self.store.active_witnesses()?),
        }
    }
}

/// Records each reward trigger. While `failing` is set every trigger fails
/// after being recorded.
#[derive(Default)]
pub struct RecordingIncentive {
    pub calls: RefCell<Vec<Vec<Address>>>,
    pub failing: Cell<bool>,
}

impl IncentiveDistributor for RecordingIncentive {
    fn distribute_rewards(&self, all_witnesses: &[Address]) -> Result<(), ConsensusError> {
        self.calls.borrow_mut().push(all_witnesses.to_vec());
        if self.failing.get() {
            return Err(ConsensusError::Collaborator {
                collaborator: "incentive",
                reason: "reward engine unavailable".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalityEvent {
    WitnessSet {
        block: u64,
        witnesses: Vec<Address>,
        next: Timestamp,
    },
    Block {
        block: u64,
        next: Timestamp,
    },
}

#[derive(Default)]
pub struct RecordingFinality {
    pub events: RefCell<Vec<FinalityEvent>>,
}

impl FinalityNotifier for RecordingFinality {
    fn witness_set_pre_prepare(
        &self,
        block: &BlockHeader,
        active_witnesses: &[Address],
        next_maintenance_time: Timestamp,
    ) {
        self.events.borrow_mut().push(FinalityEvent::WitnessSet {
            block: block.number,
            witnesses: active_witnesses.to_vec(),
            next: next_maintenance_time,
        });
    }

    fn block_pre_prepare(&self, block: &BlockHeader, next_maintenance_time: Timestamp) {
        self.events.borrow_mut().push(FinalityEvent::Block {
            block: block.number,
            next: next_maintenance_time,
        });
    }
}

#[derive(Default)]
pub struct FixedAuctions {
    pub rounds: RefCell<Vec<AuctionRound>>,
    pub eligible: RefCell<BTreeMap<u64, Vec<ChainId>>>,
    pub eligibility_calls: RefCell<Vec<(u64, usize)>>,
}

impl AuctionRoundSource for FixedAuctions {
    fn open_rounds(&self) -> Result<Vec<AuctionRound>, ConsensusError> {
        Ok(self.rounds.borrow().clone())
    }
}

impl ChainEligibility for FixedAuctions {
    fn eligible_chains(
        &self,
        round: u64,
        slot_count: usize,
    ) -> Result<Vec<ChainId>, ConsensusError> {
        self.eligibility_calls.borrow_mut().push((round, slot_count));
        Ok(self
            .eligible
            .borrow()
            .get(&round)
            .cloned()
            .unwrap_or_default())
    }
}

/// Owns a [`NullStore`] and every scripted collaborator.
pub struct Harness {
    pub store: NullStore,
    pub scheduler: ScriptedScheduler,
    pub incentive: RecordingIncentive,
    pub finality: RecordingFinality,
    pub auctions: FixedAuctions,
    pub schedule: IntervalSchedule,
    pub genesis: Vec<GenesisWitness>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: NullStore::new(),
            scheduler: ScriptedScheduler::default(),
            incentive: RecordingIncentive::default(),
            finality: RecordingFinality::default(),
            auctions: FixedAuctions::default(),
            schedule: IntervalSchedule::new(INTERVAL).unwrap(),
            genesis: Vec::new(),
        }
    }

    /// Register witnesses with the given vote counts and make `active` the
    /// active set (with matching flags).
    pub fn with_witnesses(self, witnesses: &[(Address, i64)], active: &[Address]) -> Self {
        for (address, votes) in witnesses {
            let mut record = WitnessRecord::new(*address, *votes);
            record.is_active = active.contains(address);
            self.store.add_witness(record);
        }
        self.store.put_active_witnesses(active).unwrap();
        self
    }

    /// Run `f` with a context borrowing this harness.
    pub fn with_ctx<R>(&self, f: impl FnOnce(&MaintenanceContext<'_>) -> R) -> R {
        self.with_ctx_on(&self.store, f)
    }

    /// Like [`Self::with_ctx`], with every store call going to `store`, e.g.
    /// a batch opened on the harness store.
    pub fn with_ctx_on<R>(
        &self,
        store: &NullStore,
        f: impl FnOnce(&MaintenanceContext<'_>) -> R,
    ) -> R {
        let scheduler = SchedulerWithStore {
            script: &self.scheduler,
            store,
        };
        let ctx = MaintenanceContext::new(
            ConsensusStores::from_backend(store),
            Collaborators {
                scheduler: &scheduler,
                incentive: &self.incentive,
                auctions: &self.auctions,
                eligibility: &self.auctions,
                finality: &self.finality,
                schedule: &self.schedule,
            },
            &self.genesis,
        );
        f(&ctx)
    }
}
