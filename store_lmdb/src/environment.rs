//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::account::LmdbAccountStore;
use crate::checkpoint::LmdbCheckpointStore;
use crate::cross_chain::LmdbCrossChainStore;
use crate::delegation::LmdbDelegationStore;
use crate::meta::LmdbMetaStore;
use crate::properties::LmdbPropertiesStore;
use crate::schedule::LmdbActiveWitnessStore;
use crate::votes::LmdbVotesStore;
use crate::witness::LmdbWitnessStore;
use crate::write_batch::LmdbWriteBatch;
use crate::LmdbError;

/// Number of named databases opened by [`LmdbEnvironment::open`].
pub const DATABASE_COUNT: u32 = 13;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) witnesses_db: Database<Bytes, Bytes>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) active_witnesses_db: Database<Bytes, Bytes>,
    pub(crate) properties_db: Database<Bytes, Bytes>,
    pub(crate) brokerage_db: Database<Bytes, Bytes>,
    pub(crate) cycle_snapshots_db: Database<Bytes, Bytes>,
    pub(crate) slot_tables_db: Database<Bytes, Bytes>,
    pub(crate) chain_info_db: Database<Bytes, Bytes>,
    pub(crate) header_nums_db: Database<Bytes, Bytes>,
    pub(crate) header_hashes_db: Database<Bytes, Bytes>,
    pub(crate) signer_lists_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// `max_dbs` must be at least [`DATABASE_COUNT`].
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        if max_dbs < DATABASE_COUNT {
            return Err(LmdbError::Heed(format!(
                "max_dbs {} is below the {} databases required",
                max_dbs, DATABASE_COUNT
            )));
        }
        std::fs::create_dir_all(path)?;

        let mut options = EnvOpenOptions::new();
        options.map_size(map_size).max_dbs(max_dbs);
        // SAFETY: the environment is opened once per process for this path
        // and never reopened while live.
        let env = unsafe { options.open(path)? };

        let mut wtxn = env.write_txn()?;
        let mut create = |name: &str| env.create_database::<Bytes, Bytes>(&mut wtxn, Some(name));
        let witnesses_db = create("witnesses")?;
        let accounts_db = create("accounts")?;
        let votes_db = create("votes")?;
        let active_witnesses_db = create("active_witnesses")?;
        let properties_db = create("properties")?;
        let brokerage_db = create("brokerage")?;
        let cycle_snapshots_db = create("cycle_snapshots")?;
        let slot_tables_db = create("slot_tables")?;
        let chain_info_db = create("chain_info")?;
        let header_nums_db = create("header_nums")?;
        let header_hashes_db = create("header_hashes")?;
        let signer_lists_db = create("signer_lists")?;
        let meta_db = create("meta")?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "LMDB environment opened");

        Ok(Self {
            env: Arc::new(env),
            witnesses_db,
            accounts_db,
            votes_db,
            active_witnesses_db,
            properties_db,
            brokerage_db,
            cycle_snapshots_db,
            slot_tables_db,
            chain_info_db,
            header_nums_db,
            header_hashes_db,
            signer_lists_db,
            meta_db,
        })
    }

    pub(crate) fn env(&self) -> Arc<Env> {
        Arc::clone(&self.env)
    }

    pub(crate) fn env_ref(&self) -> &Env {
        &self.env
    }

    /// Open a write batch. Stores taken from it write into one transaction
    /// that only becomes visible on [`LmdbWriteBatch::commit`].
    pub fn write_batch(&self) -> Result<LmdbWriteBatch<'_>, LmdbError> {
        LmdbWriteBatch::new(self)
    }

    pub fn witness_store(&self) -> LmdbWitnessStore {
        self.stores().witnesses
    }

    pub fn account_store(&self) -> LmdbAccountStore {
        self.stores().accounts
    }

    pub fn votes_store(&self) -> LmdbVotesStore {
        self.stores().votes
    }

    pub fn active_witness_store(&self) -> LmdbActiveWitnessStore {
        self.stores().active
    }

    pub fn properties_store(&self) -> LmdbPropertiesStore {
        self.stores().properties
    }

    pub fn delegation_store(&self) -> LmdbDelegationStore {
        self.stores().delegation
    }

    pub fn cross_chain_store(&self) -> LmdbCrossChainStore {
        self.stores().cross_chain
    }

    pub fn checkpoint_store(&self) -> LmdbCheckpointStore {
        self.stores().checkpoints
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        self.stores().meta
    }

    /// Every store, each call in its own transaction.
    pub fn stores(&self) -> LmdbStores {
        self.stores_in(self.env())
    }

    pub(crate) fn stores_in<S: Clone>(&self, scope: S) -> LmdbStores<S> {
        LmdbStores {
            witnesses: LmdbWitnessStore {
                scope: scope.clone(),
                witnesses_db: self.witnesses_db,
            },
            accounts: LmdbAccountStore {
                scope: scope.clone(),
                accounts_db: self.accounts_db,
            },
            votes: LmdbVotesStore {
                scope: scope.clone(),
                votes_db: self.votes_db,
            },
            active: LmdbActiveWitnessStore {
                scope: scope.clone(),
                active_witnesses_db: self.active_witnesses_db,
            },
            properties: LmdbPropertiesStore {
                scope: scope.clone(),
                properties_db: self.properties_db,
            },
            delegation: LmdbDelegationStore {
                scope: scope.clone(),
                brokerage_db: self.brokerage_db,
                cycle_snapshots_db: self.cycle_snapshots_db,
            },
            cross_chain: LmdbCrossChainStore {
                scope: scope.clone(),
                slot_tables_db: self.slot_tables_db,
                chain_info_db: self.chain_info_db,
            },
            checkpoints: LmdbCheckpointStore {
                scope: scope.clone(),
                header_nums_db: self.header_nums_db,
                header_hashes_db: self.header_hashes_db,
                signer_lists_db: self.signer_lists_db,
            },
            meta: LmdbMetaStore {
                scope,
                meta_db: self.meta_db,
            },
        }
    }

    /// Flush the memory map to disk.
    pub fn force_sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }
}

/// One handle per store trait, all sharing the scope `S`.
pub struct LmdbStores<S = Arc<Env>> {
    pub witnesses: LmdbWitnessStore<S>,
    pub accounts: LmdbAccountStore<S>,
    pub votes: LmdbVotesStore<S>,
    pub active: LmdbActiveWitnessStore<S>,
    pub properties: LmdbPropertiesStore<S>,
    pub delegation: LmdbDelegationStore<S>,
    pub cross_chain: LmdbCrossChainStore<S>,
    pub checkpoints: LmdbCheckpointStore<S>,
    pub meta: LmdbMetaStore<S>,
}
