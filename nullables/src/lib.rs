//! Nullable infrastructure for deterministic testing.
//!
//! Storage is abstracted behind traits elsewhere in the workspace.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap the LMDB backend for [`NullStore`] in tests and feed the
//! engine headers from [`NullChain`].

pub mod chain;
pub mod store;

pub use chain::NullChain;
pub use store::{NullBatch, NullStore};
