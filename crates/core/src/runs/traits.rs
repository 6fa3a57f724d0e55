//! Store trait for run history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::runs::model::RunResult;

/// Store trait for the append-only run history.
#[async_trait]
pub trait RunHistoryStoreTrait: Send + Sync {
    /// Insert an open (in-flight) run record.
    async fn insert(&self, run: RunResult) -> Result<RunResult>;

    /// Close an open run exactly once.
    ///
    /// Implementations must refuse to touch an already-finalized record.
    async fn finalize(
        &self,
        id: &str,
        successful: bool,
        log: String,
        finished_at: DateTime<Utc>,
    ) -> Result<RunResult>;

    /// Run history for an integration id, most-recent-first.
    fn history(&self, integration_id: &str) -> Result<Vec<RunResult>>;

    /// Delete finished runs started before the cutoff. Returns rows removed.
    async fn purge_started_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
