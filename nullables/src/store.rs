//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dpos_store::{
    AccountRecord, AccountStore, ActiveWitnessStore, CheckpointStore, CrossChainStore,
    CycleSnapshot, DelegationStore, GenesisPowerFlag, MetaStore, PropertiesStore,
    SignerListRecord, StoreError, VotesRecord, VotesStore, WitnessRecord, WitnessStore,
    DEFAULT_BROKERAGE,
};
use dpos_types::{Address, BlockHash, ChainId, Timestamp};

#[derive(Clone, Default)]
struct Properties {
    next_maintenance_time: Timestamp,
    before_maintenance_time: Timestamp,
    current_cycle: u64,
    allow_change_delegation: bool,
    genesis_power: Option<GenesisPowerFlag>,
    latest_block_header_timestamp: Timestamp,
    state_flag: bool,
}

#[derive(Clone, Default)]
struct Tables {
    witnesses: BTreeMap<Address, WitnessRecord>,
    accounts: BTreeMap<Address, AccountRecord>,
    votes: BTreeMap<Address, VotesRecord>,
    active: Vec<Address>,
    properties: Properties,
    brokerage: BTreeMap<Address, u8>,
    cycle_snapshots: BTreeMap<(u64, Address), CycleSnapshot>,
    slot_tables: BTreeMap<u64, Vec<ChainId>>,
    chain_info: BTreeMap<ChainId, Vec<u8>>,
    header_numbers: BTreeMap<ChainId, u64>,
    header_hashes: BTreeMap<ChainId, BlockHash>,
    signer_lists: BTreeMap<(ChainId, u64), SignerListRecord>,
    meta: BTreeMap<String, Vec<u8>>,
}

/// An in-memory implementation of every store trait the maintenance engine
/// uses.
///
/// Every mutating call bumps a write counter so tests can assert that an
/// operation performed no writes. [`NullStore::fail_writes`] makes every
/// subsequent mutation return [`StoreError::Backend`].
///
/// [`NullStore::begin_batch`] stages writes the way the LMDB write batch
/// does: they land on commit and vanish if the batch is dropped.
pub struct NullStore {
    tables: Mutex<Tables>,
    writes: AtomicU64,
    failing: Arc<AtomicBool>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            writes: AtomicU64::new(0),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of mutating calls that succeeded so far. Writes made through a
    /// batch count once the batch commits.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent mutating call fail with a backend error. Open
    /// batches and their commits fail too.
    pub fn fail_writes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    /// Stage writes against a copy of the current tables.
    pub fn begin_batch(&self) -> NullBatch<'_> {
        NullBatch {
            target: self,
            staged: NullStore {
                tables: Mutex::new(self.tables().clone()),
                writes: AtomicU64::new(0),
                failing: Arc::clone(&self.failing),
            },
        }
    }

    /// Register a witness together with its backing account.
    pub fn add_witness(&self, record: WitnessRecord) {
        let mut tables = self.tables();
        tables.accounts.insert(
            record.address,
            AccountRecord {
                address: record.address,
                name: String::new(),
                created_at: Timestamp::EPOCH,
            },
        );
        tables.witnesses.insert(record.address, record);
    }

    /// Remove an account, leaving any witness record in place.
    pub fn remove_account(&self, address: &Address) {
        self.tables().accounts.remove(address);
    }

    /// Every cycle snapshot row written so far.
    pub fn cycle_snapshots(&self) -> Vec<((u64, Address), CycleSnapshot)> {
        self.tables()
            .cycle_snapshots
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_failing(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".into()));
        }
        Ok(())
    }

    fn record_write(&self) -> Result<(), StoreError> {
        self.check_failing()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes staged by [`NullStore::begin_batch`].
pub struct NullBatch<'a> {
    target: &'a NullStore,
    staged: NullStore,
}

impl NullBatch<'_> {
    /// The store to read and write through while the batch is open.
    pub fn store(&self) -> &NullStore {
        &self.staged
    }

    /// Replace the target's tables with the staged ones.
    pub fn commit(self) -> Result<(), StoreError> {
        self.target.check_failing()?;
        let writes = self.staged.write_count();
        *self.target.tables() = self
            .staged
            .tables
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        self.target.writes.fetch_add(writes, Ordering::SeqCst);
        Ok(())
    }
}

impl WitnessStore for NullStore {
    fn get_witness(&self, address: &Address) -> Result<Option<WitnessRecord>, StoreError> {
        Ok(self.tables().witnesses.get(address).cloned())
    }

    fn put_witness(&self, record: &WitnessRecord) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().witnesses.insert(record.address, record.clone());
        Ok(())
    }

    fn iter_witnesses(&self) -> Result<Vec<WitnessRecord>, StoreError> {
        Ok(self.tables().witnesses.values().cloned().collect())
    }
}

impl AccountStore for NullStore {
    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().accounts.insert(record.address, record.clone());
        Ok(())
    }

    fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.tables().accounts.get(address).cloned())
    }
}

impl VotesStore for NullStore {
    fn put_votes(&self, record: &VotesRecord) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().votes.insert(record.voter, record.clone());
        Ok(())
    }

    fn get_votes(&self, voter: &Address) -> Result<Option<VotesRecord>, StoreError> {
        Ok(self.tables().votes.get(voter).cloned())
    }

    fn votes_count(&self) -> Result<u64, StoreError> {
        Ok(self.tables().votes.len() as u64)
    }

    fn drain_votes(&self) -> Result<Vec<VotesRecord>, StoreError> {
        let mut tables = self.tables();
        if tables.votes.is_empty() {
            return Ok(Vec::new());
        }
        self.record_write()?;
        Ok(std::mem::take(&mut tables.votes).into_values().collect())
    }
}

impl ActiveWitnessStore for NullStore {
    fn active_witnesses(&self) -> Result<Vec<Address>, StoreError> {
        Ok(self.tables().active.clone())
    }

    fn put_active_witnesses(&self, witnesses: &[Address]) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().active = witnesses.to_vec();
        Ok(())
    }
}

impl PropertiesStore for NullStore {
    fn next_maintenance_time(&self) -> Result<Timestamp, StoreError> {
        Ok(self.tables().properties.next_maintenance_time)
    }

    fn put_next_maintenance_time(&self, time: Timestamp) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().properties.next_maintenance_time = time;
        Ok(())
    }

    fn before_maintenance_time(&self) -> Result<Timestamp, StoreError> {
        Ok(self.tables().properties.before_maintenance_time)
    }

    fn put_before_maintenance_time(&self, time: Timestamp) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().properties.before_maintenance_time = time;
        Ok(())
    }

    fn current_cycle_number(&self) -> Result<u64, StoreError> {
        Ok(self.tables().properties.current_cycle)
    }

    fn put_current_cycle_number(&self, cycle: u64) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().properties.current_cycle = cycle;
        Ok(())
    }

    fn allow_change_delegation(&self) -> Result<bool, StoreError> {
        Ok(self.tables().properties.allow_change_delegation)
    }

    fn put_allow_change_delegation(&self, allowed: bool) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().properties.allow_change_delegation = allowed;
        Ok(())
    }

    fn genesis_power_flag(&self) -> Result<GenesisPowerFlag, StoreError> {
        Ok(self
            .tables()
            .properties
            .genesis_power
            .unwrap_or(GenesisPowerFlag::Inactive))
    }

    fn put_genesis_power_flag(&self, flag: GenesisPowerFlag) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().properties.genesis_power = Some(flag);
        Ok(())
    }

    fn latest_block_header_timestamp(&self) -> Result<Timestamp, StoreError> {
        Ok(self.tables().properties.latest_block_header_timestamp)
    }

    fn put_latest_block_header_timestamp(&self, time: Timestamp) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().properties.latest_block_header_timestamp = time;
        Ok(())
    }

    fn state_flag(&self) -> Result<bool, StoreError> {
        Ok(self.tables().properties.state_flag)
    }

    fn put_state_flag(&self, maintenance_ran: bool) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().properties.state_flag = maintenance_ran;
        Ok(())
    }
}

impl DelegationStore for NullStore {
    fn brokerage(&self, witness: &Address) -> Result<u8, StoreError> {
        Ok(self
            .tables()
            .brokerage
            .get(witness)
            .copied()
            .unwrap_or(DEFAULT_BROKERAGE))
    }

    fn put_brokerage(&self, witness: &Address, brokerage: u8) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().brokerage.insert(*witness, brokerage);
        Ok(())
    }

    fn put_cycle_snapshot(
        &self,
        cycle: u64,
        witness: &Address,
        snapshot: &CycleSnapshot,
    ) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().cycle_snapshots.insert((cycle, *witness), *snapshot);
        Ok(())
    }

    fn get_cycle_snapshot(
        &self,
        cycle: u64,
        witness: &Address,
    ) -> Result<Option<CycleSnapshot>, StoreError> {
        Ok(self.tables().cycle_snapshots.get(&(cycle, *witness)).copied())
    }
}

impl CrossChainStore for NullStore {
    fn slot_table(&self, round: u64) -> Result<Option<Vec<ChainId>>, StoreError> {
        Ok(self.tables().slot_tables.get(&round).cloned())
    }

    fn put_slot_table(&self, round: u64, chains: &[ChainId]) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().slot_tables.insert(round, chains.to_vec());
        Ok(())
    }

    fn delete_slot_table(&self, round: u64) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().slot_tables.remove(&round);
        Ok(())
    }

    fn chain_info(&self, chain: &ChainId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tables().chain_info.get(chain).cloned())
    }

    fn put_chain_info(&self, chain: &ChainId, payload: &[u8]) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().chain_info.insert(chain.clone(), payload.to_vec());
        Ok(())
    }
}

impl CheckpointStore for NullStore {
    fn latest_header_number(&self, chain: &ChainId) -> Result<Option<u64>, StoreError> {
        Ok(self.tables().header_numbers.get(chain).copied())
    }

    fn put_latest_header_number(&self, chain: &ChainId, number: u64) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().header_numbers.insert(chain.clone(), number);
        Ok(())
    }

    fn latest_header_hash(&self, chain: &ChainId) -> Result<Option<BlockHash>, StoreError> {
        Ok(self.tables().header_hashes.get(chain).copied())
    }

    fn put_latest_header_hash(
        &self,
        chain: &ChainId,
        hash: &BlockHash,
    ) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().header_hashes.insert(chain.clone(), *hash);
        Ok(())
    }

    fn signer_list(
        &self,
        chain: &ChainId,
        epoch: u64,
    ) -> Result<Option<SignerListRecord>, StoreError> {
        Ok(self.tables().signer_lists.get(&(chain.clone(), epoch)).cloned())
    }

    fn put_signer_list(
        &self,
        chain: &ChainId,
        record: &SignerListRecord,
    ) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables()
            .signer_lists
            .insert((chain.clone(), record.epoch), record.clone());
        Ok(())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().meta.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tables().meta.get(key).cloned())
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        self.record_write()?;
        self.tables().meta.remove(key);
        Ok(())
    }
}
