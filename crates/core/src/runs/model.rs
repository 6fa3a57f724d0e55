use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// The origin of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunCaller {
    /// Operator-initiated test run.
    Manual,
    /// Automatic event-driven dispatch.
    Scheduler,
}

impl RunCaller {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunCaller::Manual => "MANUAL",
            RunCaller::Scheduler => "SCHEDULER",
        }
    }
}

impl std::str::FromStr for RunCaller {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANUAL" => Ok(RunCaller::Manual),
            "SCHEDULER" => Ok(RunCaller::Scheduler),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown run caller: {}",
                other
            ))
            .into()),
        }
    }
}

/// Audit record of one dispatch attempt.
///
/// `integration_id` is a weak reference: it survives deletion of the
/// integration so the audit trail stays intact. A record with
/// `finished_at = None` is still in flight and must not be treated as
/// terminal; once finalized the record is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub id: String,
    pub integration_id: String,
    pub caller: RunCaller,
    pub successful: bool,
    pub log: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunResult {
    /// True once the record has been finalized.
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// Shared transcript buffer for a single run.
///
/// Executors and plugin loggers append lines concurrently; the full contents
/// become the `log` of the finalized [`RunResult`].
#[derive(Clone, Default)]
pub struct RunLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line to the transcript.
    pub fn line(&self, text: impl Into<String>) {
        self.lines.lock().unwrap().push(text.into());
    }

    /// The transcript collected so far, newline-joined.
    pub fn contents(&self) -> String {
        self.lines.lock().unwrap().join("\n")
    }
}
