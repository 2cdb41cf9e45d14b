//! Fundamental types for the DPoS maintenance engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: witness addresses, block references, side-chain identifiers,
//! timestamps and genesis allocations.

pub mod address;
pub mod block;
pub mod chain;
pub mod error;
pub mod genesis;
pub mod time;

pub use address::{Address, ADDRESS_LEN};
pub use block::{BlockHash, BlockHeader};
pub use chain::ChainId;
pub use error::TypesError;
pub use genesis::GenesisWitness;
pub use time::Timestamp;
