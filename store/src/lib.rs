//! Abstract storage traits for the DPoS maintenance engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engine depends only on the traits and never opens a
//! transaction of its own; grouping the writes of one block is up to the
//! backend.

pub mod account;
pub mod checkpoint;
pub mod cross_chain;
pub mod delegation;
pub mod error;
pub mod meta;
pub mod properties;
pub mod schedule;
pub mod votes;
pub mod witness;

pub use account::{AccountRecord, AccountStore};
pub use checkpoint::{CheckpointStore, SignerListRecord};
pub use cross_chain::{CrossChainInfo, CrossChainStore};
pub use delegation::{CycleSnapshot, DelegationStore, DEFAULT_BROKERAGE};
pub use error::StoreError;
pub use meta::MetaStore;
pub use properties::{GenesisPowerFlag, PropertiesStore};
pub use schedule::ActiveWitnessStore;
pub use votes::{Vote, VotesRecord, VotesStore};
pub use witness::{WitnessRecord, WitnessStore};
