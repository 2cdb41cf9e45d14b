//! Prometheus metrics for the maintenance node.
//!
//! The [`NodeMetrics`] struct owns a dedicated [`Registry`] that can be
//! encoded into the Prometheus text exposition format with
//! [`NodeMetrics::encode`].

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

use dpos_consensus::BlockOutcome;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Blocks handed to the maintenance engine.
    pub blocks_applied: IntCounter,
    /// Maintenance runs completed.
    pub maintenance_runs: IntCounter,
    /// Vote-ledger records consumed by tallies.
    pub votes_tallied: IntCounter,
    /// Runs whose active witness set changed membership.
    pub witness_set_changes: IntCounter,
    /// Witness or account records that were missing during a run.
    pub missing_records: IntCounter,
    /// Side-chain registrations that could not be decoded.
    pub malformed_records: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Current delegation cycle.
    pub current_cycle: IntGauge,
    /// Size of the active witness set.
    pub active_witnesses: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent applying one block, in milliseconds.
    pub block_apply_time_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let blocks_applied = register_int_counter_with_registry!(
            Opts::new("dpos_blocks_applied_total", "Total blocks applied"),
            registry
        )
        .expect("failed to register blocks_applied counter");

        let maintenance_runs = register_int_counter_with_registry!(
            Opts::new(
                "dpos_maintenance_runs_total",
                "Total maintenance runs completed"
            ),
            registry
        )
        .expect("failed to register maintenance_runs counter");

        let votes_tallied = register_int_counter_with_registry!(
            Opts::new(
                "dpos_votes_tallied_total",
                "Total vote-ledger records consumed by maintenance"
            ),
            registry
        )
        .expect("failed to register votes_tallied counter");

        let witness_set_changes = register_int_counter_with_registry!(
            Opts::new(
                "dpos_witness_set_changes_total",
                "Total maintenance runs that changed the active witness set"
            ),
            registry
        )
        .expect("failed to register witness_set_changes counter");

        let missing_records = register_int_counter_with_registry!(
            Opts::new(
                "dpos_missing_records_total",
                "Witness or account records missing during maintenance"
            ),
            registry
        )
        .expect("failed to register missing_records counter");

        let malformed_records = register_int_counter_with_registry!(
            Opts::new(
                "dpos_malformed_chain_records_total",
                "Side-chain registrations that could not be decoded"
            ),
            registry
        )
        .expect("failed to register malformed_records counter");

        let current_cycle = register_int_gauge_with_registry!(
            Opts::new("dpos_current_cycle", "Current delegation cycle number"),
            registry
        )
        .expect("failed to register current_cycle gauge");

        let active_witnesses = register_int_gauge_with_registry!(
            Opts::new("dpos_active_witnesses", "Size of the active witness set"),
            registry
        )
        .expect("failed to register active_witnesses gauge");

        let block_apply_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "dpos_block_apply_time_ms",
                "Time spent applying one block, in milliseconds"
            )
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0]),
            registry
        )
        .expect("failed to register block_apply_time_ms histogram");

        Self {
            registry,
            blocks_applied,
            maintenance_runs,
            votes_tallied,
            witness_set_changes,
            missing_records,
            malformed_records,
            current_cycle,
            active_witnesses,
            block_apply_time_ms,
        }
    }

    /// Fold one block's outcome into the counters.
    pub fn record_outcome(&self, outcome: &BlockOutcome) {
        self.blocks_applied.inc();
        self.active_witnesses
            .set(outcome.state.current_witness.len() as i64);

        let Some(report) = &outcome.report else {
            return;
        };
        self.maintenance_runs.inc();
        self.votes_tallied.inc_by(report.votes_consumed);
        if report.witness_set_changed {
            self.witness_set_changes.inc();
        }
        self.missing_records.inc_by(report.missing_records() as u64);
        self.malformed_records
            .inc_by(report.malformed_records() as u64);
        if let Some(cycle) = report.cycle_advanced_to {
            self.current_cycle.set(cycle as i64);
        }
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
