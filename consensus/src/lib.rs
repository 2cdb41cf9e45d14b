//! Consensus maintenance: the periodic epoch work of a delegated
//! proof-of-stake node.
//!
//! Once per maintenance interval the engine tallies accumulated stake votes,
//! rotates the active witness set, triggers reward distribution, advances
//! the delegation cycle and rolls over the side-chain slot tables, then
//! signals the finality layer with the new witness set and the next
//! boundary time.
//!
//! ## Module overview
//!
//! - [`applier`]: Per-block entry point and boundary detection.
//! - [`maintenance`]: One maintenance run, step by step.
//! - [`vote_tally`]: Drains the vote-delta ledger into net changes.
//! - [`genesis_power`]: One-shot removal of bootstrap vote weight.
//! - [`rotation`]: Applies deltas and rotates the active set.
//! - [`cycle`]: Delegation cycle counter and snapshots.
//! - [`cross_chain`]: Side-chain slot tables and checkpoints.
//! - [`schedule`]: Fixed-interval boundary schedule.
//! - [`collaborators`]: Traits for the services the engine calls out to.
//! - [`context`]: Borrowed stores and collaborators for one block.
//! - [`report`]: What a maintenance run did.
//! - [`error`]: Consensus error types.

pub mod applier;
pub mod collaborators;
pub mod context;
pub mod cross_chain;
pub mod cycle;
pub mod error;
pub mod genesis_power;
pub mod maintenance;
pub mod report;
pub mod rotation;
pub mod schedule;
pub mod vote_tally;

#[cfg(test)]
mod test_support;

pub use applier::{BlockOutcome, MaintenanceManager, MaintenanceState};
pub use collaborators::{
    AuctionRound, AuctionRoundSource, ChainEligibility, FinalityNotifier, IncentiveDistributor,
    MaintenanceSchedule, WitnessScheduler,
};
pub use context::{Collaborators, ConsensusStores, MaintenanceContext};
pub use cross_chain::{lookup_chain_info, signer_list_epoch, ChainInfoLookup, CrossChainEpochRotator};
pub use cycle::advance_cycle;
pub use error::ConsensusError;
pub use genesis_power::revoke_genesis_power;
pub use maintenance::do_maintenance;
pub use report::{MaintenanceIssue, MaintenanceReport};
pub use rotation::rotate_witnesses;
pub use schedule::IntervalSchedule;
pub use vote_tally::{tally_votes, VoteTally};
