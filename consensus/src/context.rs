//! Borrowed handles to everything a maintenance run touches.
//!
//! The context is built by the block-application caller for each block and
//! passed down explicitly; no component reaches for a global registry.

use dpos_store::{
    AccountStore, ActiveWitnessStore, CheckpointStore, CrossChainStore, DelegationStore,
    PropertiesStore, VotesStore, WitnessStore,
};
use dpos_types::GenesisWitness;

use crate::collaborators::{
    AuctionRoundSource, ChainEligibility, FinalityNotifier, IncentiveDistributor,
    MaintenanceSchedule, WitnessScheduler,
};

/// The stores read and written during maintenance.
#[derive(Clone, Copy)]
pub struct ConsensusStores<'a> {
    pub witnesses: &'a dyn WitnessStore,
    pub accounts: &'a dyn AccountStore,
    pub votes: &'a dyn VotesStore,
    pub active: &'a dyn ActiveWitnessStore,
    pub properties: &'a dyn PropertiesStore,
    pub delegation: &'a dyn DelegationStore,
    pub cross_chain: &'a dyn CrossChainStore,
    pub checkpoints: &'a dyn CheckpointStore,
}

impl<'a> ConsensusStores<'a> {
    /// Borrow every store from a single backend implementing all traits.
    pub fn from_backend<S>(store: &'a S) -> Self
    where
        S: WitnessStore
            + AccountStore
            + VotesStore
            + ActiveWitnessStore
            + PropertiesStore
            + DelegationStore
            + CrossChainStore
            + CheckpointStore,
    {
        Self {
            witnesses: store,
            accounts: store,
            votes: store,
            active: store,
            properties: store,
            delegation: store,
            cross_chain: store,
            checkpoints: store,
        }
    }
}

/// The external services invoked during maintenance.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub scheduler: &'a dyn WitnessScheduler,
    pub incentive: &'a dyn IncentiveDistributor,
    pub auctions: &'a dyn AuctionRoundSource,
    pub eligibility: &'a dyn ChainEligibility,
    pub finality: &'a dyn FinalityNotifier,
    pub schedule: &'a dyn MaintenanceSchedule,
}

#[derive(Clone, Copy)]
pub struct MaintenanceContext<'a> {
    pub stores: ConsensusStores<'a>,
    pub services: Collaborators<'a>,
    /// Witnesses and their bootstrap allocations from the genesis block.
    pub genesis_witnesses: &'a [GenesisWitness],
}

impl<'a> MaintenanceContext<'a> {
    pub fn new(
        stores: ConsensusStores<'a>,
        services: Collaborators<'a>,
        genesis_witnesses: &'a [GenesisWitness],
    ) -> Self {
        Self {
            stores,
            services,
            genesis_witnesses,
        }
    }
}
