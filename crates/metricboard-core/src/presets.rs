//! Built-in dashboard layouts.
//!
//! Three boards share one 25-metric schema: node-level and network-level
//! boards show every duration as a rolling chart, the VM counters as cards and
//! the p2p send latency as a gauge; the explorer board tracks only full
//! transaction validation. All durations are instantaneous readings, so every
//! series here uses replace mode.

use std::collections::BTreeMap;

use crate::board::MetricConfig;
use crate::config::{BoardConfig, DashboardConfig};
use crate::schema::MetricSchema;

/// Window length for node and network charts.
pub const DASHBOARD_CAPACITY: usize = 50;

/// Window length for the explorer chart.
pub const EXPLORER_CAPACITY: usize = 25;

/// X-axis units advanced per pushed snapshot.
pub const DEFAULT_TICK_INCREMENT: u64 = 5;

pub const NODE_EVENT: &str = "node_points";
pub const NETWORK_EVENT: &str = "network_points";
pub const EXPLORER_EVENT: &str = "explorer_stats_points";
pub const WORLDMAP_EVENT: &str = "worldmap_update";

/// Durations charted over time (ms).
pub const DURATION_METRICS: &[&str] = &[
    "archethic_election_validation_nodes_duration",
    "archethic_election_storage_nodes_duration",
    "archethic_mining_pending_transaction_validation_duration",
    "archethic_mining_proof_of_work_duration",
    "archethic_mining_full_transaction_validation_duration",
    "archethic_contract_parsing_duration",
    "archethic_mining_fetch_context_duration",
    "archethic_db_duration",
];

/// Latency shown on an auto-ranging gauge.
pub const GAUGE_METRICS: &[&str] = &["archethic_p2p_send_message_duration"];

/// Latest-value cards.
pub const CARD_METRICS: &[&str] = &[
    "archethic_self_repair_duration",
    "vm_memory_processes",
    "vm_memory_ets",
    "vm_memory_binary",
    "vm_memory_system",
    "vm_memory_processes_used",
    "vm_memory_total",
    "vm_system_counts_process_count",
    "vm_memory_atom",
    "vm_total_run_queue_lengths_cpu",
    "vm_system_counts_atom_count",
    "vm_total_run_queue_lengths_total",
    "vm_memory_atom_used",
    "vm_total_run_queue_lengths_io",
    "vm_system_counts_port_count",
    "vm_memory_code",
];

pub fn default_schema() -> MetricSchema {
    MetricSchema::with_keys(
        DURATION_METRICS
            .iter()
            .chain(GAUGE_METRICS)
            .chain(CARD_METRICS)
            .copied(),
    )
}

fn full_board(name: &str, event: &str) -> BoardConfig {
    let mut metrics = BTreeMap::new();
    for key in DURATION_METRICS {
        metrics.insert(key.to_string(), MetricConfig::series(DASHBOARD_CAPACITY));
    }
    for key in GAUGE_METRICS {
        metrics.insert(key.to_string(), MetricConfig::gauge());
    }
    for key in CARD_METRICS {
        metrics.insert(key.to_string(), MetricConfig::card());
    }
    BoardConfig {
        name: name.to_string(),
        event: event.to_string(),
        tick_increment: DEFAULT_TICK_INCREMENT,
        metrics,
    }
}

pub fn node_board_config() -> BoardConfig {
    full_board("node", NODE_EVENT)
}

pub fn network_board_config() -> BoardConfig {
    full_board("network", NETWORK_EVENT)
}

pub fn explorer_board_config() -> BoardConfig {
    BoardConfig {
        name: "explorer".to_string(),
        event: EXPLORER_EVENT.to_string(),
        tick_increment: DEFAULT_TICK_INCREMENT,
        metrics: BTreeMap::from([(
            "archethic_mining_full_transaction_validation_duration".to_string(),
            MetricConfig::series(EXPLORER_CAPACITY),
        )]),
    }
}

pub fn default_dashboard_config() -> DashboardConfig {
    DashboardConfig {
        schema: default_schema(),
        boards: vec![
            node_board_config(),
            network_board_config(),
            explorer_board_config(),
        ],
        worldmap_event: Some(WORLDMAP_EVENT.to_string()),
    }
}
