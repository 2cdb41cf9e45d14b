//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use dpos_consensus::AuctionRound;
use dpos_types::{Address, ChainId, GenesisWitness, Timestamp};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a maintenance node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// LMDB memory map size in bytes.
    #[serde(default = "default_map_size")]
    pub lmdb_map_size: usize,

    /// Length of one maintenance epoch, in milliseconds.
    #[serde(default = "default_maintenance_interval")]
    pub maintenance_interval_ms: u64,

    /// Size of the active witness set chosen at each boundary.
    #[serde(default = "default_max_active_witnesses")]
    pub max_active_witnesses: usize,

    /// Whether the delegation cycle advances at each boundary.
    #[serde(default)]
    pub allow_change_delegation: bool,

    /// Strip the genesis allocation from genesis witnesses at the first
    /// maintenance run.
    #[serde(default)]
    pub remove_genesis_power: bool,

    #[serde(default)]
    pub genesis_witnesses: Vec<GenesisWitnessConfig>,

    /// Side-chain slot auctions known to this node.
    #[serde(default)]
    pub auction_rounds: Vec<AuctionRoundConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisWitnessConfig {
    /// Hex-encoded 21-byte address.
    pub address: String,
    pub votes: i64,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionRoundConfig {
    pub round: u64,
    pub end_time_ms: u64,
    pub duration_ms: u64,
    pub slot_count: usize,
    /// Candidate chain ids, best first.
    #[serde(default)]
    pub candidates: Vec<String>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./dpos_data")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_maintenance_interval() -> u64 {
    6 * 60 * 60 * 1000
}

fn default_max_active_witnesses() -> usize {
    27
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.maintenance_interval_ms == 0 {
            return Err(NodeError::Config(
                "maintenance_interval_ms must be greater than zero".into(),
            ));
        }
        if self.max_active_witnesses == 0 {
            return Err(NodeError::Config(
                "max_active_witnesses must be greater than zero".into(),
            ));
        }
        self.log_format()?;
        self.genesis_witnesses()?;
        self.auction_rounds()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// Decoded genesis witnesses. Addresses must be unique.
    pub fn genesis_witnesses(&self) -> Result<Vec<GenesisWitness>, NodeError> {
        let mut witnesses: Vec<GenesisWitness> = Vec::with_capacity(self.genesis_witnesses.len());
        for entry in &self.genesis_witnesses {
            let address = Address::from_hex(&entry.address)?;
            if witnesses.iter().any(|w| w.address == address) {
                return Err(NodeError::Config(format!(
                    "duplicate genesis witness {address}"
                )));
            }
            let mut witness = GenesisWitness::new(address, entry.votes);
            witness.url = entry.url.clone();
            witnesses.push(witness);
        }
        Ok(witnesses)
    }

    /// Decoded auction rounds with their ranked candidates.
    pub fn auction_rounds(&self) -> Result<Vec<(AuctionRound, Vec<ChainId>)>, NodeError> {
        self.auction_rounds
            .iter()
            .map(|r| -> Result<_, NodeError> {
                let candidates = r
                    .candidates
                    .iter()
                    .map(|c| ChainId::parse(c))
                    .collect::<Result<Vec<_>, _>>()?;
                let round = AuctionRound {
                    round: r.round,
                    end_time: Timestamp::new(r.end_time_ms),
                    duration: r.duration_ms,
                    slot_count: r.slot_count,
                };
                Ok((round, candidates))
            })
            .collect()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            lmdb_map_size: default_map_size(),
            maintenance_interval_ms: default_maintenance_interval(),
            max_active_witnesses: default_max_active_witnesses(),
            allow_change_delegation: false,
            remove_genesis_power: false,
            genesis_witnesses: Vec::new(),
            auction_rounds: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W1: &str = "411111111111111111111111111111111111111111";
    const W2: &str = "412222222222222222222222222222222222222222";

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.maintenance_interval_ms, config.maintenance_interval_ms);
        assert_eq!(parsed.max_active_witnesses, config.max_active_witnesses);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.maintenance_interval_ms, 21_600_000);
        assert_eq!(config.max_active_witnesses, 27);
        assert_eq!(config.log_format, "human");
        assert!(!config.allow_change_delegation);
        assert!(config.genesis_witnesses.is_empty());
    }

    #[test]
    fn full_toml_decodes_genesis_and_auctions() {
        let toml = format!(
            r#"
            maintenance_interval_ms = 1000
            allow_change_delegation = true
            remove_genesis_power = true

            [[genesis_witnesses]]
            address = "{W1}"
            votes = 100
            url = "https://w1.example"

            [[genesis_witnesses]]
            address = "0x{W2}"
            votes = 50

            [[auction_rounds]]
            round = 1
            end_time_ms = 5000
            duration_ms = 2000
            slot_count = 2
            candidates = ["a", "b", "c"]
        "#
        );
        let config = NodeConfig::from_toml_str(&toml).expect("should parse");

        let genesis = config.genesis_witnesses().unwrap();
        assert_eq!(genesis.len(), 2);
        assert_eq!(genesis[0].vote_count, 100);
        assert_eq!(genesis[0].url, "https://w1.example");
        assert_eq!(genesis[1].address, Address::from_hex(W2).unwrap());

        let rounds = config.auction_rounds().unwrap();
        assert_eq!(rounds[0].0.expires_at(), Timestamp::new(7000));
        assert_eq!(rounds[0].1.len(), 3);
    }

    #[test]
    fn zero_interval_rejected() {
        let result = NodeConfig::from_toml_str("maintenance_interval_ms = 0");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn bad_genesis_address_rejected() {
        let toml = r#"
            [[genesis_witnesses]]
            address = "not-hex"
            votes = 1
        "#;
        assert!(NodeConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn duplicate_genesis_witness_rejected() {
        let toml = format!(
            r#"
            [[genesis_witnesses]]
            address = "{W1}"
            votes = 1

            [[genesis_witnesses]]
            address = "{W1}"
            votes = 2
        "#
        );
        assert!(matches!(
            NodeConfig::from_toml_str(&toml),
            Err(NodeError::Config(_))
        ));
    }

    #[test]
    fn unknown_log_format_rejected() {
        assert!(NodeConfig::from_toml_str(r#"log_format = "xml""#).is_err());
    }

    #[test]
    fn missing_file_returns_io_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/dpos.toml");
        assert!(matches!(result, Err(NodeError::Io(_))));
    }
}
