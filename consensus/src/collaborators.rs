//! External collaborators the maintenance engine calls out to.
//!
//! None of the policies behind these traits are defined by the engine: the
//! ranking of witnesses, the reward maths, the side-chain eligibility order
//! and the finality protocol all live elsewhere. The engine only fixes *when*
//! each collaborator is invoked and with which inputs.

use dpos_types::{Address, BlockHeader, ChainId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::ConsensusError;

/// Picks the active witness set from the full registered list.
pub trait WitnessScheduler {
    /// Called after vote deltas have been applied, so stored vote counts are
    /// current. Returns the new active set in production order.
    fn recompute_active_set(&self, all_witnesses: &[Address])
        -> Result<Vec<Address>, ConsensusError>;
}

/// Distributes rewards for the epoch that just ended.
pub trait IncentiveDistributor {
    fn distribute_rewards(&self, all_witnesses: &[Address]) -> Result<(), ConsensusError>;
}

/// An open side-chain slot auction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionRound {
    pub round: u64,
    /// Bidding closes at this time; slots are assigned after it.
    pub end_time: Timestamp,
    /// Length of the window after `end_time` during which the assignment is
    /// live, in milliseconds.
    pub duration: u64,
    pub slot_count: usize,
}

impl AuctionRound {
    /// End of the grace window, after which the slot table is dropped.
    pub fn expires_at(&self) -> Timestamp {
        self.end_time.saturating_add(self.duration)
    }
}

/// Supplies the auction rounds currently open.
pub trait AuctionRoundSource {
    fn open_rounds(&self) -> Result<Vec<AuctionRound>, ConsensusError>;
}

/// Ranks side-chains competing for a round's slots.
pub trait ChainEligibility {
    /// Chain ids ordered by eligibility, best first. May return more than
    /// `slot_count` entries; the engine keeps the first `slot_count`.
    fn eligible_chains(&self, round: u64, slot_count: usize)
        -> Result<Vec<ChainId>, ConsensusError>;
}

/// Hooks into the finality protocol.
pub trait FinalityNotifier {
    /// A new witness set takes effect at the next boundary.
    fn witness_set_pre_prepare(
        &self,
        block: &BlockHeader,
        active_witnesses: &[Address],
        next_maintenance_time: Timestamp,
    );

    /// Emitted for every applied block.
    fn block_pre_prepare(&self, block: &BlockHeader, next_maintenance_time: Timestamp);
}

/// Decides the next maintenance boundary.
pub trait MaintenanceSchedule {
    /// `current` is the boundary stored before this block. The result must
    /// be strictly greater than `block_time` whenever `current <= block_time`
    /// and must never be less than `current`.
    fn next_maintenance_time(&self, current: Timestamp, block_time: Timestamp) -> Timestamp;
}
