//! Sandboxed plugin execution.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::integrations::{Integration, PluginSpec};
use crate::photos::{PhotoReadStoreTrait, PhotoSnapshot};
use crate::plugins::{
    PluginContext, PluginKvStoreTrait, PluginLoader, PluginLogger, PluginServices, ScopedKv,
};
use crate::runs::{RunCaller, RunHistoryService, RunLog, RunResult};
use crate::utils::{env_template, kv_text};

/// Which plugin handler an invocation targets, with its payload.
#[derive(Debug, Clone)]
pub enum PluginInvocation {
    GlobalChange,
    PhotoPublish {
        photo: PhotoSnapshot,
        params: BTreeMap<String, String>,
    },
    PhotoUnpublish {
        photo: PhotoSnapshot,
        params: BTreeMap<String, String>,
    },
}

impl PluginInvocation {
    pub fn handler_name(&self) -> &'static str {
        match self {
            PluginInvocation::GlobalChange => "on_global_change",
            PluginInvocation::PhotoPublish { .. } => "on_photo_publish",
            PluginInvocation::PhotoUnpublish { .. } => "on_photo_unpublish",
        }
    }
}

/// Executes Plugin integrations.
///
/// The module is resolved fresh on every invocation (hot reload). The
/// invocation itself runs on its own task under a wall-clock budget; a
/// panic, a plugin error, or an exceeded budget becomes a failed run record
/// and never reaches the worker handling sibling integrations.
pub struct PluginExecutor {
    loader: Arc<PluginLoader>,
    kv: Arc<dyn PluginKvStoreTrait>,
    photos: Arc<dyn PhotoReadStoreTrait>,
    history: Arc<RunHistoryService>,
    budget: Duration,
}

impl PluginExecutor {
    pub fn new(
        loader: Arc<PluginLoader>,
        kv: Arc<dyn PluginKvStoreTrait>,
        photos: Arc<dyn PhotoReadStoreTrait>,
        history: Arc<RunHistoryService>,
        budget: Duration,
    ) -> Self {
        PluginExecutor {
            loader,
            kv,
            photos,
            history,
            budget,
        }
    }

    /// Runs one handler invocation and returns the finalized run record.
    pub async fn execute(
        &self,
        integration: &Integration,
        spec: &PluginSpec,
        invocation: PluginInvocation,
        caller: RunCaller,
    ) -> Result<RunResult> {
        let open = self.history.begin(&integration.id, caller).await?;
        let log = open.log.clone();
        let successful = self.perform(spec, invocation, &log).await;
        self.history.finish(open, successful).await
    }

    async fn perform(&self, spec: &PluginSpec, invocation: PluginInvocation, log: &RunLog) -> bool {
        log.line(format!("Handler: {}", invocation.handler_name()));

        let loaded = match self.loader.resolve(&spec.module) {
            Ok(loaded) => loaded,
            Err(e) => {
                log.line(format!("ERROR {}", e));
                return false;
            }
        };

        let config = match kv_text::parse_kv_block(&spec.config) {
            Ok(config) => config,
            Err(e) => {
                log.line(format!("ERROR {}", e));
                return false;
            }
        };
        // Env references in config values resolve now, not at definition time.
        let config: BTreeMap<String, String> = config
            .into_iter()
            .map(|(key, value)| (key, env_template::expand_env(&value)))
            .collect();

        let services = PluginServices::new(
            ScopedKv::new(loaded.manifest.uuid.as_str(), Arc::clone(&self.kv)),
            Arc::clone(&self.photos),
            PluginLogger::new(loaded.manifest.name.clone(), log.clone()),
        );
        let factory = loaded.factory;

        let handle = tokio::spawn(async move {
            let mut plugin = factory(PluginContext { config, services })?;
            match invocation {
                PluginInvocation::GlobalChange => plugin.on_global_change().await,
                PluginInvocation::PhotoPublish { photo, params } => {
                    plugin.on_photo_publish(&photo, &params).await
                }
                PluginInvocation::PhotoUnpublish { photo, params } => {
                    plugin.on_photo_unpublish(&photo, &params).await
                }
            }
        });
        let abort = handle.abort_handle();

        match tokio::time::timeout(self.budget, handle).await {
            Err(_elapsed) => {
                // A hung plugin must not occupy its worker indefinitely.
                abort.abort();
                log.line(format!(
                    "ERROR plugin exceeded its {}s wall-clock budget",
                    self.budget.as_secs()
                ));
                false
            }
            Ok(Err(join_err)) => {
                log.line(format!("ERROR plugin task aborted: {}", join_err));
                false
            }
            Ok(Ok(Err(plugin_err))) => {
                log.line(format!("ERROR {}", plugin_err));
                false
            }
            Ok(Ok(Ok(()))) => true,
        }
    }
}
