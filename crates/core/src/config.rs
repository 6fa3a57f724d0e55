//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the dispatch engine.
///
/// Every tunable has an explicit default; nothing is inherited from the
/// environment or the OS. In particular both outbound budgets (HTTP timeout
/// and plugin wall-clock budget) are always set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    /// Quiet period after the last global trigger before dispatch fires (default: 10s)
    pub debounce_delay_secs: u64,

    /// Extra lifetime granted to a debounce counter beyond the delay (default: 60s)
    pub debounce_safety_margin_secs: u64,

    /// Timeout applied to every outbound HTTP call (default: 30s)
    pub http_timeout_secs: u64,

    /// Wall-clock budget for a single plugin invocation (default: 60s)
    pub plugin_budget_secs: u64,

    /// Age past which finished run records are purged (default: 365 days)
    pub run_retention_days: i64,

    /// Interval between best-effort retention sweeps (default: 24h)
    pub retention_sweep_interval_secs: u64,

    /// Directory scanned for plugin module manifests
    pub plugin_dir: PathBuf,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            debounce_delay_secs: 10,
            debounce_safety_margin_secs: 60,
            http_timeout_secs: 30,
            plugin_budget_secs: 60,
            run_retention_days: 365,
            retention_sweep_interval_secs: 60 * 60 * 24,
            plugin_dir: PathBuf::from("plugins"),
        }
    }
}

impl DispatchConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_secs(self.debounce_delay_secs)
    }

    pub fn debounce_safety_margin(&self) -> Duration {
        Duration::from_secs(self.debounce_safety_margin_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn plugin_budget(&self) -> Duration {
        Duration::from_secs(self.plugin_budget_secs)
    }

    pub fn retention_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.retention_sweep_interval_secs)
    }
}
