use dpos_store::StoreError;
use dpos_types::Timestamp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    /// A read or write against the persistent store failed. Fatal for the
    /// block being applied.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An external collaborator (scheduler, incentive, eligibility source)
    /// failed.
    #[error("{collaborator} failed: {reason}")]
    Collaborator {
        collaborator: &'static str,
        reason: String,
    },

    #[error("maintenance schedule went backwards: {next} after {current} at block time {block_time}")]
    ScheduleRegression {
        current: Timestamp,
        next: Timestamp,
        block_time: Timestamp,
    },

    #[error("invalid maintenance interval: {0}")]
    InvalidInterval(u64),
}
