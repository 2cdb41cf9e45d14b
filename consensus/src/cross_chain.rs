//! Cross-chain epoch rotation.
//!
//! Side-chains win slots in time-boxed auction rounds. Once a round's bidding
//! closes, the best `slot_count` eligible chains are written to the round's
//! slot table and each assigned chain's header-sync progress is checkpointed.
//! When the round's grace window ends the table is removed again.

use dpos_store::{CrossChainInfo, CrossChainStore, SignerListRecord};
use dpos_types::{ChainId, Timestamp};

use crate::collaborators::AuctionRound;
use crate::context::MaintenanceContext;
use crate::report::{MaintenanceIssue, MaintenanceReport};
use crate::ConsensusError;

/// Result of reading a chain's registration info.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainInfoLookup {
    /// Not registered, or registered with an empty payload.
    Absent,
    /// Present but undecodable or internally inconsistent.
    Malformed(String),
    Ready(CrossChainInfo),
}

pub fn lookup_chain_info(
    store: &dyn CrossChainStore,
    chain: &ChainId,
) -> Result<ChainInfoLookup, ConsensusError> {
    let payload = match store.chain_info(chain)? {
        Some(payload) if !payload.is_empty() => payload,
        _ => return Ok(ChainInfoLookup::Absent),
    };
    let info: CrossChainInfo = match bincode::deserialize(&payload) {
        Ok(info) => info,
        Err(e) => return Ok(ChainInfoLookup::Malformed(e.to_string())),
    };
    if info.maintenance_time_interval == 0 {
        return Ok(ChainInfoLookup::Malformed(
            "maintenance time interval is zero".into(),
        ));
    }
    Ok(ChainInfoLookup::Ready(info))
}

/// Epoch a side-chain's signer list belongs to: the boundary on the chain's
/// own maintenance grid at or before the next one after `block_time`.
///
/// `interval` must be non-zero.
pub fn signer_list_epoch(block_time: Timestamp, interval: u64) -> u64 {
    let millis = block_time.as_millis();
    let epoch = (millis / interval).saturating_add(1).saturating_mul(interval);
    if millis % interval == 0 {
        epoch.saturating_sub(interval)
    } else {
        epoch
    }
}

pub struct CrossChainEpochRotator<'c, 'a> {
    ctx: &'c MaintenanceContext<'a>,
}

impl<'c, 'a> CrossChainEpochRotator<'c, 'a> {
    pub fn new(ctx: &'c MaintenanceContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn rotate(&self, report: &mut MaintenanceReport) -> Result<(), ConsensusError> {
        let now = self.ctx.stores.properties.latest_block_header_timestamp()?;
        let rounds = self.ctx.services.auctions.open_rounds()?;

        for round in rounds.iter().filter(|r| r.end_time < now) {
            if now < round.expires_at() {
                self.assign_round(round, report)?;
            } else {
                self.expire_round(round, report)?;
            }
        }
        Ok(())
    }

    fn assign_round(
        &self,
        round: &AuctionRound,
        report: &mut MaintenanceReport,
    ) -> Result<(), ConsensusError> {
        let store = self.ctx.stores.cross_chain;
        if store.slot_table(round.round)?.is_some() {
            return Ok(());
        }

        let mut chains = self
            .ctx
            .services
            .eligibility
            .eligible_chains(round.round, round.slot_count)?;
        chains.truncate(round.slot_count);
        store.put_slot_table(round.round, &chains)?;
        tracing::info!(round = round.round, chains = ?chains, "slot table assigned");
        report.slot_tables_assigned.push(round.round);

        for chain in &chains {
            self.checkpoint_chain(chain, report)?;
        }
        Ok(())
    }

    fn expire_round(
        &self,
        round: &AuctionRound,
        report: &mut MaintenanceReport,
    ) -> Result<(), ConsensusError> {
        let store = self.ctx.stores.cross_chain;
        if store.slot_table(round.round)?.is_none() {
            return Ok(());
        }
        store.delete_slot_table(round.round)?;
        tracing::info!(round = round.round, "slot table expired");
        report.slot_tables_deleted.push(round.round);
        Ok(())
    }

    fn checkpoint_chain(
        &self,
        chain: &ChainId,
        report: &mut MaintenanceReport,
    ) -> Result<(), ConsensusError> {
        let info = match lookup_chain_info(self.ctx.stores.cross_chain, chain)? {
            ChainInfoLookup::Absent => return Ok(()),
            ChainInfoLookup::Malformed(reason) => {
                tracing::error!(%chain, %reason, "malformed chain info, skipping checkpoint");
                report.issue(MaintenanceIssue::MalformedChainInfo {
                    chain: chain.clone(),
                    reason,
                });
                return Ok(());
            }
            ChainInfoLookup::Ready(info) => info,
        };

        let checkpoints = self.ctx.stores.checkpoints;
        // A chain with no recorded header counts as synced to height 0.
        let Some(target) = info.begin_sync_height.checked_sub(1) else {
            tracing::debug!(%chain, "no sync height, checkpoint skipped");
            return Ok(());
        };
        let synced = checkpoints.latest_header_number(chain)?.unwrap_or(0);
        if target <= synced {
            tracing::debug!(%chain, synced, target, "checkpoint already ahead");
            return Ok(());
        }

        checkpoints.put_latest_header_number(chain, target)?;
        checkpoints.put_latest_header_hash(chain, &info.parent_block_hash)?;

        let epoch = signer_list_epoch(info.block_time, info.maintenance_time_interval);
        checkpoints.put_signer_list(
            chain,
            &SignerListRecord {
                epoch,
                signers: info.signer_list,
            },
        )?;

        tracing::debug!(%chain, height = target, epoch, "side-chain checkpointed");
        report.checkpointed_chains.push(chain.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use dpos_store::{CheckpointStore, PropertiesStore};
    use dpos_types::BlockHash;

    fn chain(name: &str) -> ChainId {
        ChainId::new(name)
    }

    fn info(name: &str, begin: u64, block_time: u64, interval: u64) -> CrossChainInfo {
        CrossChainInfo {
            chain_id: chain(name),
            begin_sync_height: begin,
            parent_block_hash: BlockHash::new([7; 32]),
            block_time: Timestamp::new(block_time),
            maintenance_time_interval: interval,
            signer_list: vec![1, 2, 3],
        }
    }

    fn register(h: &Harness, info: &CrossChainInfo) {
        h.store
            .put_chain_info(&info.chain_id, &bincode::serialize(info).unwrap())
            .unwrap();
    }

    fn harness_at(now: u64) -> Harness {
        let h = Harness::new();
        h.store
            .put_latest_block_header_timestamp(Timestamp::new(now))
            .unwrap();
        h.auctions.rounds.borrow_mut().push(AuctionRound {
            round: 1,
            end_time: Timestamp::new(1_000),
            duration: 500,
            slot_count: 2,
        });
        h.auctions
            .eligible
            .borrow_mut()
            .insert(1, vec![chain("a"), chain("b"), chain("c")]);
        h
    }

    fn rotate(h: &Harness) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();
        h.with_ctx(|ctx| CrossChainEpochRotator::new(ctx).rotate(&mut report))
            .unwrap();
        report
    }

    #[test]
    fn epoch_rounds_up_to_next_boundary() {
        assert_eq!(signer_list_epoch(Timestamp::new(3_600), 1_000), 4_000);
        assert_eq!(signer_list_epoch(Timestamp::new(4_000), 1_000), 4_000 - 1_000);
        assert_eq!(signer_list_epoch(Timestamp::EPOCH, 1_000), 0);
    }

    #[test]
    fn ended_round_gets_truncated_table() {
        let h = harness_at(1_200);
        let report = rotate(&h);

        assert_eq!(h.store.slot_table(1).unwrap(), Some(vec![chain("a"), chain("b")]));
        assert_eq!(report.slot_tables_assigned, vec![1]);
        assert_eq!(*h.auctions.eligibility_calls.borrow(), vec![(1, 2)]);
    }

    #[test]
    fn existing_table_is_kept() {
        let h = harness_at(1_200);
        rotate(&h);
        let report = rotate(&h);

        assert!(report.slot_tables_assigned.is_empty());
        assert_eq!(h.auctions.eligibility_calls.borrow().len(), 1);
    }

    #[test]
    fn open_round_is_ignored() {
        let h = harness_at(1_000);
        rotate(&h);
        assert_eq!(h.store.slot_table(1).unwrap(), None);
    }

    #[test]
    fn table_deleted_after_grace_window() {
        let h = harness_at(1_200);
        rotate(&h);
        h.store
            .put_latest_block_header_timestamp(Timestamp::new(1_500))
            .unwrap();

        let report = rotate(&h);
        assert_eq!(h.store.slot_table(1).unwrap(), None);
        assert_eq!(report.slot_tables_deleted, vec![1]);

        let report = rotate(&h);
        assert!(report.slot_tables_deleted.is_empty());
    }

    #[test]
    fn empty_eligibility_still_marks_round_assigned() {
        let h = harness_at(1_200);
        h.auctions.eligible.borrow_mut().clear();
        rotate(&h);
        rotate(&h);
        assert_eq!(h.store.slot_table(1).unwrap(), Some(vec![]));
        assert_eq!(h.auctions.eligibility_calls.borrow().len(), 1);
    }

    #[test]
    fn assigned_chain_is_checkpointed() {
        let h = harness_at(1_200);
        register(&h, &info("a", 1_000, 3_600, 1_000));

        let report = rotate(&h);

        let a = chain("a");
        assert_eq!(h.store.latest_header_number(&a).unwrap(), Some(999));
        assert_eq!(
            h.store.latest_header_hash(&a).unwrap(),
            Some(BlockHash::new([7; 32]))
        );
        assert_eq!(
            h.store.signer_list(&a, 4_000).unwrap(),
            Some(SignerListRecord {
                epoch: 4_000,
                signers: vec![1, 2, 3]
            })
        );
        // "b" has no chain info and is skipped silently
        assert_eq!(report.checkpointed_chains, vec![a]);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn checkpoint_never_moves_backwards() {
        let h = harness_at(1_200);
        let a = chain("a");
        register(&h, &info("a", 1_000, 3_600, 1_000));
        h.store.put_latest_header_number(&a, 2_000).unwrap();

        let report = rotate(&h);

        assert_eq!(h.store.latest_header_number(&a).unwrap(), Some(2_000));
        assert_eq!(h.store.signer_list(&a, 4_000).unwrap(), None);
        assert!(report.checkpointed_chains.is_empty());
    }

    #[test]
    fn zero_sync_height_writes_no_checkpoint() {
        let h = harness_at(1_200);
        let a = chain("a");
        register(&h, &info("a", 0, 3_600, 1_000));

        let report = rotate(&h);

        assert_eq!(h.store.latest_header_number(&a).unwrap(), None);
        assert_eq!(h.store.latest_header_hash(&a).unwrap(), None);
        assert_eq!(h.store.signer_list(&a, 4_000).unwrap(), None);
        assert!(report.checkpointed_chains.is_empty());
    }

    #[test]
    fn sync_height_one_is_already_covered() {
        let h = harness_at(1_200);
        let a = chain("a");
        register(&h, &info("a", 1, 3_600, 1_000));

        let report = rotate(&h);

        assert_eq!(h.store.latest_header_number(&a).unwrap(), None);
        assert_eq!(h.store.signer_list(&a, 4_000).unwrap(), None);
        assert!(report.checkpointed_chains.is_empty());
    }

    #[test]
    fn malformed_chain_info_is_reported_and_skipped() {
        let h = harness_at(1_200);
        h.store.put_chain_info(&chain("a"), &[0xff]).unwrap();
        register(&h, &info("b", 10, 3_600, 1_000));

        let report = rotate(&h);

        assert_eq!(report.malformed_records(), 1);
        assert_eq!(h.store.latest_header_number(&chain("a")).unwrap(), None);
        assert_eq!(h.store.latest_header_number(&chain("b")).unwrap(), Some(9));
    }

    #[test]
    fn zero_interval_is_malformed() {
        let h = Harness::new();
        let a = chain("a");
        h.store
            .put_chain_info(&a, &bincode::serialize(&info("a", 1, 1, 0)).unwrap())
            .unwrap();
        assert!(matches!(
            lookup_chain_info(&h.store, &a).unwrap(),
            ChainInfoLookup::Malformed(_)
        ));
    }

    #[test]
    fn empty_payload_is_absent() {
        let h = Harness::new();
        h.store.put_chain_info(&chain("a"), &[]).unwrap();
        assert_eq!(
            lookup_chain_info(&h.store, &chain("a")).unwrap(),
            ChainInfoLookup::Absent
        );
        assert_eq!(
            lookup_chain_info(&h.store, &chain("z")).unwrap(),
            ChainInfoLookup::Absent
        );
    }
}
