use chrono::{DateTime, Utc};
use diesel::prelude::*;

use photofolio_core::errors::{Error, ValidationError};
use photofolio_core::runs::RunResult;

/// Database row for a run record. Timestamps are RFC 3339 text.
#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::integration_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RunResultDb {
    pub id: String,
    pub integration_id: String,
    pub caller: String,
    pub successful: bool,
    pub log: String,
    pub started_at: String,
    pub finished_at: Option<String>,
}

impl From<RunResult> for RunResultDb {
    fn from(run: RunResult) -> Self {
        RunResultDb {
            id: run.id,
            integration_id: run.integration_id,
            caller: run.caller.as_str().to_string(),
            successful: run.successful,
            log: run.log,
            started_at: run.started_at.to_rfc3339(),
            finished_at: run.finished_at.map(|ts| ts.to_rfc3339()),
        }
    }
}

impl TryFrom<RunResultDb> for RunResult {
    type Error = Error;

    fn try_from(row: RunResultDb) -> Result<Self, Self::Error> {
        Ok(RunResult {
            caller: row.caller.parse()?,
            started_at: parse_timestamp(&row.started_at)?,
            finished_at: row
                .finished_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            id: row.id,
            integration_id: row.integration_id,
            successful: row.successful,
            log: row.log,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidInput(format!("Bad timestamp '{}': {}", raw, e)).into())
}
