use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::model::RunResultDb;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::integration_runs;
use photofolio_core::errors::{DatabaseError, Result};
use photofolio_core::runs::{RunHistoryStoreTrait, RunResult};

pub struct RunHistoryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RunHistoryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        RunHistoryRepository { pool, writer }
    }
}

#[async_trait]
impl RunHistoryStoreTrait for RunHistoryRepository {
    async fn insert(&self, run: RunResult) -> Result<RunResult> {
        let row = RunResultDb::from(run);
        self.writer
            .exec(move |conn| {
                diesel::insert_into(integration_runs::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                row.try_into()
            })
            .await
    }

    async fn finalize(
        &self,
        id: &str,
        successful: bool,
        log: String,
        finished_at: DateTime<Utc>,
    ) -> Result<RunResult> {
        let id = id.to_string();
        self.writer
            .exec(move |conn| {
                // The NULL guard keeps finalized records immutable: a second
                // finalize matches nothing.
                let updated = diesel::update(
                    integration_runs::table
                        .find(&id)
                        .filter(integration_runs::finished_at.is_null()),
                )
                .set((
                    integration_runs::successful.eq(successful),
                    integration_runs::log.eq(&log),
                    integration_runs::finished_at.eq(finished_at.to_rfc3339()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Open run {} (already finalized or never started)",
                        id
                    ))
                    .into());
                }

                let row = integration_runs::table
                    .find(&id)
                    .first::<RunResultDb>(conn)
                    .map_err(StorageError::from)?;
                row.try_into()
            })
            .await
    }

    fn history(&self, integration_id: &str) -> Result<Vec<RunResult>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = integration_runs::table
            .filter(integration_runs::integration_id.eq(integration_id))
            .order(integration_runs::started_at.desc())
            .load::<RunResultDb>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn purge_started_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = cutoff.to_rfc3339();
        self.writer
            .exec(move |conn| {
                // In-flight records are never purged, whatever their age.
                let deleted = diesel::delete(
                    integration_runs::table
                        .filter(integration_runs::started_at.lt(&cutoff))
                        .filter(integration_runs::finished_at.is_not_null()),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}
