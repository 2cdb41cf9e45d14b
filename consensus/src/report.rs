//! What a maintenance run did.

use dpos_types::{Address, ChainId};
use serde::Serialize;

/// An item-scoped problem that was logged and skipped. None of these abort
/// the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MaintenanceIssue {
    /// A witness record referenced by a vote delta, a genesis allocation or
    /// an active set was not found.
    MissingWitness(Address),
    /// The account backing a witness was not found.
    MissingAccount(Address),
    /// A side-chain's registration info could not be decoded.
    MalformedChainInfo { chain: ChainId, reason: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub genesis_power_revoked: bool,
    /// Vote-ledger records consumed by the tally.
    pub votes_consumed: u64,
    /// Witnesses with an entry in the tally (including zero nets).
    pub tallied_witnesses: usize,
    /// Witnesses whose stored vote count changed.
    pub vote_counts_updated: usize,
    /// Active set before rotation; `None` when rotation was skipped.
    pub previous_active: Option<Vec<Address>>,
    /// Active set after rotation; `None` when rotation was skipped.
    pub new_active: Option<Vec<Address>>,
    pub witness_set_changed: bool,
    pub cycle_advanced_to: Option<u64>,
    pub slot_tables_assigned: Vec<u64>,
    pub slot_tables_deleted: Vec<u64>,
    pub checkpointed_chains: Vec<ChainId>,
    pub issues: Vec<MaintenanceIssue>,
}

impl MaintenanceReport {
    pub fn rotation_ran(&self) -> bool {
        self.new_active.is_some()
    }

    pub(crate) fn issue(&mut self, issue: MaintenanceIssue) {
        self.issues.push(issue);
    }

    pub fn missing_records(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| {
                matches!(
                    i,
                    MaintenanceIssue::MissingWitness(_) | MaintenanceIssue::MissingAccount(_)
                )
            })
            .count()
    }

    pub fn malformed_records(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, MaintenanceIssue::MalformedChainInfo { .. }))
            .count()
    }
}
