//! LMDB storage backend for the DPoS maintenance engine.
//!
//! Implements all storage traits from `dpos-store` using the `heed` LMDB bindings.
//! Each logical store maps to one or more LMDB databases within a single environment.
//! Stores taken from [`LmdbEnvironment::stores`] commit one transaction per
//! call. Stores taken from a [`LmdbWriteBatch`] share the batch's transaction
//! and nothing they write lands until the batch commits.

mod codec;

pub mod account;
pub mod checkpoint;
pub mod cross_chain;
pub mod delegation;
pub mod environment;
pub mod error;
pub mod meta;
pub mod migration;
pub mod properties;
pub mod schedule;
pub mod txn;
pub mod votes;
pub mod witness;
pub mod write_batch;

pub use account::LmdbAccountStore;
pub use checkpoint::LmdbCheckpointStore;
pub use cross_chain::LmdbCrossChainStore;
pub use delegation::LmdbDelegationStore;
pub use environment::{LmdbEnvironment, LmdbStores, DATABASE_COUNT};
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
pub use properties::LmdbPropertiesStore;
pub use schedule::LmdbActiveWitnessStore;
pub use votes::LmdbVotesStore;
pub use txn::TxnScope;
pub use witness::LmdbWitnessStore;
pub use write_batch::{BatchStores, LmdbWriteBatch};
