use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::errors::Result;
use crate::runs::model::{RunCaller, RunLog, RunResult};
use crate::runs::traits::RunHistoryStoreTrait;

/// Service wrapping the run history store.
///
/// Executors open a run before any work starts and finish it on every exit
/// path, so the history never contains an attempt without a record.
pub struct RunHistoryService {
    store: Arc<dyn RunHistoryStoreTrait>,
}

/// Handle for a run that has been opened but not yet finalized.
pub struct OpenRun {
    pub id: String,
    pub integration_id: String,
    pub log: RunLog,
}

impl RunHistoryService {
    pub fn new(store: Arc<dyn RunHistoryStoreTrait>) -> Self {
        RunHistoryService { store }
    }

    /// Opens a run record with `started_at` set to now.
    pub async fn begin(&self, integration_id: &str, caller: RunCaller) -> Result<OpenRun> {
        let run = RunResult {
            id: Uuid::new_v4().to_string(),
            integration_id: integration_id.to_string(),
            caller,
            successful: false,
            log: String::new(),
            started_at: Utc::now(),
            finished_at: None,
        };
        let run = self.store.insert(run).await?;
        Ok(OpenRun {
            id: run.id,
            integration_id: run.integration_id,
            log: RunLog::new(),
        })
    }

    /// Finalizes an open run with its outcome and the collected transcript.
    pub async fn finish(&self, open: OpenRun, successful: bool) -> Result<RunResult> {
        self.store
            .finalize(&open.id, successful, open.log.contents(), Utc::now())
            .await
    }

    /// Run history for an integration, most-recent-first.
    pub fn history(&self, integration_id: &str) -> Result<Vec<RunResult>> {
        self.store.history(integration_id)
    }

    /// Best-effort purge of runs older than the retention horizon.
    pub async fn purge_older_than_days(&self, days: i64) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(days);
        self.store.purge_started_before(cutoff).await
    }
}
