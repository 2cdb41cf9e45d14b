//! DPoS maintenance node: runs the epoch-maintenance engine on top of the
//! LMDB backend.
//!
//! The node:
//! - Loads its configuration from TOML
//! - Opens the LMDB environment and migrates its schema
//! - Seeds genesis witnesses into a fresh store
//! - Applies blocks in order, running maintenance at each boundary
//! - Exposes Prometheus metrics and a status snapshot

pub mod collaborators;
pub mod config;
pub mod error;
pub mod genesis;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod tracing_spans;

pub use collaborators::{
    BlockNotice, LoggingIncentive, StaticAuctions, TracingFinalityNotifier, VoteRankScheduler,
    WitnessSetNotice,
};
pub use config::{AuctionRoundConfig, GenesisWitnessConfig, NodeConfig};
pub use error::NodeError;
pub use genesis::{bootstrap_genesis, GenesisSettings, GENESIS_MARKER_KEY};
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::{consensus_stores, MaintenanceNode, NodeStatus, WitnessStatus};
