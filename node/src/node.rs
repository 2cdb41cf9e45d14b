//! The maintenance node: wires the LMDB stores, the engine and its default
//! collaborators together.

use std::time::Instant;

use serde::Serialize;

use dpos_consensus::{
    BlockOutcome, Collaborators, ConsensusStores, IncentiveDistributor, IntervalSchedule,
    MaintenanceContext, MaintenanceManager, MaintenanceState,
};
use dpos_store::{PropertiesStore, VotesStore, WitnessStore};
use dpos_store_lmdb::{LmdbEnvironment, LmdbStores, Migrator, TxnScope, DATABASE_COUNT};
use dpos_types::{Address, BlockHeader, GenesisWitness, Timestamp};

use crate::collaborators::{
    BlockNotice, LoggingIncentive, StaticAuctions, TracingFinalityNotifier, VoteRankScheduler,
    WitnessSetNotice,
};
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::genesis::{bootstrap_genesis, GenesisSettings};
use crate::metrics::NodeMetrics;
use crate::tracing_spans::block_apply_span;

/// Borrow every LMDB store as the engine's store bundle.
pub fn consensus_stores<S: TxnScope>(stores: &LmdbStores<S>) -> ConsensusStores<'_> {
    ConsensusStores {
        witnesses: &stores.witnesses,
        accounts: &stores.accounts,
        votes: &stores.votes,
        active: &stores.active,
        properties: &stores.properties,
        delegation: &stores.delegation,
        cross_chain: &stores.cross_chain,
        checkpoints: &stores.checkpoints,
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct WitnessStatus {
    pub address: Address,
    pub vote_count: i64,
    pub is_active: bool,
    pub url: String,
}

/// Snapshot of the persisted maintenance state, for operators.
#[derive(Clone, Debug, Serialize)]
pub struct NodeStatus {
    pub state: MaintenanceState,
    pub current_cycle: u64,
    pub allow_change_delegation: bool,
    pub latest_block_timestamp: Timestamp,
    pub pending_votes: u64,
    pub witnesses: Vec<WitnessStatus>,
    pub last_witness_set: Option<WitnessSetNotice>,
    pub last_block: Option<BlockNotice>,
}

pub struct MaintenanceNode {
    config: NodeConfig,
    // Keeps the environment open for as long as the stores are in use.
    env: LmdbEnvironment,
    stores: LmdbStores,
    genesis: Vec<GenesisWitness>,
    schedule: IntervalSchedule,
    incentive: Box<dyn IncentiveDistributor>,
    auctions: StaticAuctions,
    finality: TracingFinalityNotifier,
    manager: MaintenanceManager,
    metrics: NodeMetrics,
}

impl MaintenanceNode {
    /// Open (or create) the store under `config.data_dir`, bring its schema
    /// up to date, write genesis state if the store is fresh and load the
    /// engine state.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let genesis = config.genesis_witnesses()?;
        let auctions = StaticAuctions::new(config.auction_rounds()?);
        let schedule = IntervalSchedule::new(config.maintenance_interval_ms)?;

        std::fs::create_dir_all(&config.data_dir)?;
        let env = LmdbEnvironment::open(&config.data_dir, DATABASE_COUNT, config.lmdb_map_size)?;
        let stores = env.stores();
        Migrator::run(&stores.meta)?;

        let batch = env.write_batch()?;
        {
            let seeding = batch.stores();
            bootstrap_genesis(
                consensus_stores(&seeding),
                &seeding.meta,
                &GenesisSettings {
                    witnesses: genesis.clone(),
                    allow_change_delegation: config.allow_change_delegation,
                    remove_genesis_power: config.remove_genesis_power,
                },
            )?;
        }
        batch.commit()?;

        let mut node = Self {
            config,
            env,
            stores,
            genesis,
            schedule,
            incentive: Box::new(LoggingIncentive),
            auctions,
            finality: TracingFinalityNotifier::default(),
            manager: MaintenanceManager::new(),
            metrics: NodeMetrics::new(),
        };
        node.init_manager()?;
        tracing::info!(
            data_dir = %node.config.data_dir.display(),
            next_maintenance_time = %node.manager.state().next_maintenance_time,
            "maintenance node opened"
        );
        Ok(node)
    }

    /// Replace the reward collaborator, e.g. with the chain's reward engine.
    pub fn with_incentive(mut self, incentive: Box<dyn IncentiveDistributor>) -> Self {
        self.incentive = incentive;
        self
    }

    fn init_manager(&mut self) -> Result<(), NodeError> {
        let scheduler =
            VoteRankScheduler::new(&self.stores.witnesses, self.config.max_active_witnesses);
        let ctx = MaintenanceContext::new(
            consensus_stores(&self.stores),
            Collaborators {
                scheduler: &scheduler,
                incentive: self.incentive.as_ref(),
                auctions: &self.auctions,
                eligibility: &self.auctions,
                finality: &self.finality,
                schedule: &self.schedule,
            },
            &self.genesis,
        );
        self.manager.init(&ctx)?;
        Ok(())
    }

    /// Apply one block. Blocks must be applied in order.
    ///
    /// Every store write the block causes goes into one write batch that is
    /// committed only if the whole block succeeds. On error the store and
    /// the in-memory state are as they were before the call, so the block
    /// can be retried.
    pub fn apply_block(&mut self, block: &BlockHeader) -> Result<BlockOutcome, NodeError> {
        let _span = block_apply_span(block).entered();
        let started = Instant::now();
        let previous = self.manager.state().clone();

        let batch = self.env.write_batch()?;
        let outcome = {
            let stores = batch.stores();
            stores
                .properties
                .put_latest_block_header_timestamp(block.timestamp)?;

            let scheduler =
                VoteRankScheduler::new(&stores.witnesses, self.config.max_active_witnesses);
            let ctx = MaintenanceContext::new(
                consensus_stores(&stores),
                Collaborators {
                    scheduler: &scheduler,
                    incentive: self.incentive.as_ref(),
                    auctions: &self.auctions,
                    eligibility: &self.auctions,
                    finality: &self.finality,
                    schedule: &self.schedule,
                },
                &self.genesis,
            );
            self.manager.apply_block(&ctx, block)?
        };
        if let Err(e) = batch.commit() {
            self.manager.restore(previous);
            return Err(e.into());
        }
        self.env.force_sync()?;

        self.metrics.record_outcome(&outcome);
        self.metrics
            .block_apply_time_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        Ok(outcome)
    }

    pub fn status(&self) -> Result<NodeStatus, NodeError> {
        let properties = &self.stores.properties;
        let witnesses = self
            .stores
            .witnesses
            .iter_witnesses()?
            .into_iter()
            .map(|w| WitnessStatus {
                address: w.address,
                vote_count: w.vote_count,
                is_active: w.is_active,
                url: w.url,
            })
            .collect();
        Ok(NodeStatus {
            state: self.manager.state().clone(),
            current_cycle: properties.current_cycle_number()?,
            allow_change_delegation: properties.allow_change_delegation()?,
            latest_block_timestamp: properties.latest_block_header_timestamp()?,
            pending_votes: self.stores.votes.votes_count()?,
            witnesses,
            last_witness_set: self.finality.last_witness_set(),
            last_block: self.finality.last_block(),
        })
    }

    pub fn state(&self) -> &MaintenanceState {
        self.manager.state()
    }

    /// Direct access to the stores, e.g. for the transaction pipeline to
    /// record votes.
    pub fn stores(&self) -> &LmdbStores {
        &self.stores
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}
