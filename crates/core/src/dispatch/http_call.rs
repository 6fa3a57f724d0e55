//! Outbound HTTP call execution.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::integrations::{HttpCallSpec, Integration};
use crate::runs::{RunCaller, RunHistoryService, RunLog, RunResult};
use crate::utils::{env_template, kv_text};

/// Executes HttpCall integrations.
///
/// Every attempt produces exactly one finalized run record: the full request
/// description plus the response, or the transport error text when the call
/// never completed. Header validation runs before the network call, so a
/// malformed definition never reaches the wire.
pub struct HttpCallExecutor {
    client: reqwest::Client,
    history: Arc<RunHistoryService>,
}

impl HttpCallExecutor {
    /// Builds an executor whose client enforces `timeout` on every call.
    pub fn new(history: Arc<RunHistoryService>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::errors::Error::Unexpected(e.to_string()))?;
        Ok(HttpCallExecutor { client, history })
    }

    /// Runs the call and returns the finalized run record.
    pub async fn execute(
        &self,
        integration: &Integration,
        spec: &HttpCallSpec,
        caller: RunCaller,
    ) -> Result<RunResult> {
        let open = self.history.begin(&integration.id, caller).await?;
        let log = open.log.clone();
        // perform() cannot early-return past this point without the record
        // being finalized below.
        let successful = self.perform(spec, &log).await;
        self.history.finish(open, successful).await
    }

    async fn perform(&self, spec: &HttpCallSpec, log: &RunLog) -> bool {
        let headers = match kv_text::parse_header_block(&spec.headers) {
            Ok(headers) => headers,
            Err(e) => {
                log.line(format!("ERROR {}", e));
                return false;
            }
        };

        // Placeholders resolve at execution time, not at definition time.
        let url = env_template::expand_env(&spec.url);
        let body = env_template::expand_env(&spec.body);

        log.line(format!("Request: {} {}", spec.method, url));
        if !headers.is_empty() {
            let names: Vec<&str> = headers.iter().map(|(name, _)| name.as_str()).collect();
            log.line(format!("Headers: {}", names.join(", ")));
        }

        let mut request = self.client.request(spec.method.into(), url.clone());
        for (name, value) in &headers {
            request = request.header(name.as_str(), env_template::expand_env(value));
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let text = response.text().await.unwrap_or_default();
                log.line(format!("Response: {}", status));
                if !text.is_empty() {
                    log.line(text);
                }
                if (200..300).contains(&status) {
                    true
                } else {
                    log.line(format!("ERROR non-success status {}", status));
                    false
                }
            }
            Err(e) => {
                log.line(format!("ERROR {}", e));
                false
            }
        }
    }
}
