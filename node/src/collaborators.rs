//! Default implementations of the engine's external collaborators.
//!
//! These give a standalone node sensible behaviour out of the box. A full
//! chain would plug in its own reward engine and finality protocol.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use dpos_consensus::{
    AuctionRound, AuctionRoundSource, ChainEligibility, ConsensusError, FinalityNotifier,
    IncentiveDistributor, WitnessScheduler,
};
use dpos_store::WitnessStore;
use dpos_types::{Address, BlockHeader, ChainId, Timestamp};

/// Ranks witnesses by vote count, highest first, and keeps the top
/// `max_active`. Equal counts are ordered by address bytes, highest first.
pub struct VoteRankScheduler<'a> {
    witnesses: &'a dyn WitnessStore,
    max_active: usize,
}

impl<'a> VoteRankScheduler<'a> {
    pub fn new(witnesses: &'a dyn WitnessStore, max_active: usize) -> Self {
        Self {
            witnesses,
            max_active,
        }
    }
}

impl WitnessScheduler for VoteRankScheduler<'_> {
    fn recompute_active_set(
        &self,
        all_witnesses: &[Address],
    ) -> Result<Vec<Address>, ConsensusError> {
        let mut ranked = Vec::with_capacity(all_witnesses.len());
        for address in all_witnesses {
            match self.witnesses.get_witness(address)? {
                Some(witness) => ranked.push((witness.vote_count, *address)),
                None => tracing::warn!(%address, "unknown witness left out of ranking"),
            }
        }
        ranked.sort_by(|a, b| b.cmp(a));
        Ok(ranked
            .into_iter()
            .take(self.max_active)
            .map(|(_, address)| address)
            .collect())
    }
}

/// Logs the reward trigger. Reward maths lives outside this node.
#[derive(Default)]
pub struct LoggingIncentive;

impl IncentiveDistributor for LoggingIncentive {
    fn distribute_rewards(&self, all_witnesses: &[Address]) -> Result<(), ConsensusError> {
        tracing::info!(witnesses = all_witnesses.len(), "epoch rewards due");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WitnessSetNotice {
    pub block: u64,
    pub witnesses: Vec<Address>,
    pub next_maintenance_time: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockNotice {
    pub block: u64,
    pub next_maintenance_time: Timestamp,
}

/// Traces every finality hook and remembers the most recent of each.
#[derive(Default)]
pub struct TracingFinalityNotifier {
    last_witness_set: Mutex<Option<WitnessSetNotice>>,
    last_block: Mutex<Option<BlockNotice>>,
}

impl TracingFinalityNotifier {
    pub fn last_witness_set(&self) -> Option<WitnessSetNotice> {
        self.last_witness_set
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn last_block(&self) -> Option<BlockNotice> {
        self.last_block.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl FinalityNotifier for TracingFinalityNotifier {
    fn witness_set_pre_prepare(
        &self,
        block: &BlockHeader,
        active_witnesses: &[Address],
        next_maintenance_time: Timestamp,
    ) {
        tracing::info!(
            block = block.number,
            witnesses = active_witnesses.len(),
            next_maintenance_time = %next_maintenance_time,
            "finality: witness set pre-prepare"
        );
        if let Ok(mut last) = self.last_witness_set.lock() {
            *last = Some(WitnessSetNotice {
                block: block.number,
                witnesses: active_witnesses.to_vec(),
                next_maintenance_time,
            });
        }
    }

    fn block_pre_prepare(&self, block: &BlockHeader, next_maintenance_time: Timestamp) {
        tracing::debug!(
            block = block.number,
            next_maintenance_time = %next_maintenance_time,
            "finality: block pre-prepare"
        );
        if let Ok(mut last) = self.last_block.lock() {
            *last = Some(BlockNotice {
                block: block.number,
                next_maintenance_time,
            });
        }
    }
}

/// Auction rounds and their ranked candidates, fixed at startup.
#[derive(Default)]
pub struct StaticAuctions {
    rounds: Vec<AuctionRound>,
    candidates: BTreeMap<u64, Vec<ChainId>>,
}

impl StaticAuctions {
    pub fn new(rounds: Vec<(AuctionRound, Vec<ChainId>)>) -> Self {
        let mut auctions = Self::default();
        for (round, candidates) in rounds {
            auctions.candidates.insert(round.round, candidates);
            auctions.rounds.push(round);
        }
        auctions
    }
}

impl AuctionRoundSource for StaticAuctions {
    fn open_rounds(&self) -> Result<Vec<AuctionRound>, ConsensusError> {
        Ok(self.rounds.clone())
    }
}

impl ChainEligibility for StaticAuctions {
    fn eligible_chains(
        &self,
        round: u64,
        slot_count: usize,
    ) -> Result<Vec<ChainId>, ConsensusError> {
        Ok(self
            .candidates
            .get(&round)
            .map(|c| c.iter().take(slot_count).cloned().collect())
            .unwrap_or_default())
    }
}
