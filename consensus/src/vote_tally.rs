//! Vote tally: drains the pending vote-delta ledger into net per-witness
//! changes.
//!
//! This is the only reader of the ledger. Every record is consumed exactly
//! once: the drain hands back all records and leaves the ledger empty in
//! one store operation, so a failure before the drain commits leaves every
//! record in place for the retry of the same block.

use std::collections::BTreeMap;

use dpos_store::{StoreError, VotesStore};
use dpos_types::Address;

/// Net vote change per witness for the epoch that just ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteTally {
    /// witness → Σ new counts − Σ old counts. Entries may be zero or
    /// negative; nothing is clamped.
    pub deltas: BTreeMap<Address, i64>,
    /// Number of ledger records consumed.
    pub records: u64,
}

impl VoteTally {
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn delta(&self, witness: &Address) -> i64 {
        self.deltas.get(witness).copied().unwrap_or(0)
    }
}

/// Drain the ledger and accumulate net deltas.
pub fn tally_votes(votes: &dyn VotesStore) -> Result<VoteTally, StoreError> {
    let records = votes.drain_votes()?;
    let mut tally = VoteTally::default();

    for record in &records {
        for vote in &record.old_votes {
            let net = tally.deltas.entry(vote.witness).or_insert(0);
            *net = net.saturating_sub(vote.count);
        }
        for vote in &record.new_votes {
            let net = tally.deltas.entry(vote.witness).or_insert(0);
            *net = net.saturating_add(vote.count);
        }
        tally.records += 1;
    }

    tracing::info!(records = tally.records, witnesses = tally.deltas.len(), "votes tallied for epoch");
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::addr;
    use dpos_nullables::NullStore;
    use dpos_store::{Vote, VotesRecord};
    use proptest::prelude::*;

    #[test]
    fn example_ledger_nets_out() {
        let store = NullStore::new();
        let (w1, w2) = (addr(1), addr(2));
        store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(w1, 100)]))
            .unwrap();
        store
            .put_votes(&VotesRecord::new(
                addr(11),
                vec![Vote::new(w1, 30)],
                vec![Vote::new(w2, 30)],
            ))
            .unwrap();

        let tally = tally_votes(&store).unwrap();

        assert_eq!(tally.delta(&w1), 70);
        assert_eq!(tally.delta(&w2), 30);
        assert_eq!(tally.deltas.len(), 2);
        assert_eq!(tally.records, 2);
        assert_eq!(store.votes_count().unwrap(), 0);
    }

    #[test]
    fn empty_ledger_yields_empty_tally_without_writes() {
        let store = NullStore::new();
        let tally = tally_votes(&store).unwrap();
        assert!(tally.is_empty());
        assert_eq!(tally.records, 0);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn withdrawn_votes_go_negative() {
        let store = NullStore::new();
        store
            .put_votes(&VotesRecord::new(addr(10), vec![Vote::new(addr(1), 500)], vec![]))
            .unwrap();
        let tally = tally_votes(&store).unwrap();
        assert_eq!(tally.delta(&addr(1)), -500);
    }

    #[test]
    fn unchanged_allocation_keeps_zero_entry() {
        let store = NullStore::new();
        store
            .put_votes(&VotesRecord::new(
                addr(10),
                vec![Vote::new(addr(1), 40)],
                vec![Vote::new(addr(1), 40)],
            ))
            .unwrap();
        let tally = tally_votes(&store).unwrap();
        assert!(!tally.is_empty());
        assert_eq!(tally.delta(&addr(1)), 0);
    }

    #[test]
    fn second_tally_sees_nothing() {
        let store = NullStore::new();
        store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(1), 1)]))
            .unwrap();
        tally_votes(&store).unwrap();
        assert!(tally_votes(&store).unwrap().is_empty());
    }

    #[test]
    fn failed_drain_propagates_and_keeps_ledger() {
        let store = NullStore::new();
        store
            .put_votes(&VotesRecord::new(addr(10), vec![], vec![Vote::new(addr(1), 1)]))
            .unwrap();
        store.fail_writes(true);
        assert!(tally_votes(&store).is_err());
        store.fail_writes(false);
        assert_eq!(store.votes_count().unwrap(), 1);
    }

    fn arb_votes() -> impl Strategy<Value = Vec<(u8, i64)>> {
        prop::collection::vec((0u8..6, 0i64..1_000_000), 0..5)
    }

    proptest! {
        #[test]
        fn net_equals_new_minus_old(
            entries in prop::collection::vec((arb_votes(), arb_votes()), 1..12)
        ) {
            let store = NullStore::new();
            let mut expected: BTreeMap<Address, i64> = BTreeMap::new();

            for (i, (old, new)) in entries.iter().enumerate() {
                let to_votes = |v: &Vec<(u8, i64)>| {
                    v.iter().map(|(w, c)| Vote::new(addr(*w), *c)).collect::<Vec<_>>()
                };
                for (w, c) in old {
                    *expected.entry(addr(*w)).or_insert(0) -= c;
                }
                for (w, c) in new {
                    *expected.entry(addr(*w)).or_insert(0) += c;
                }
                store
                    .put_votes(&VotesRecord::new(addr(100 + i as u8), to_votes(old), to_votes(new)))
                    .unwrap();
            }

            let tally = tally_votes(&store).unwrap();
            prop_assert_eq!(store.votes_count().unwrap(), 0);
            prop_assert_eq!(tally.records, entries.len() as u64);
            prop_assert_eq!(tally.deltas, expected);
        }
    }
}
