//! Event routing to registered integrations.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;

use crate::dispatch::http_call::HttpCallExecutor;
use crate::dispatch::plugin_exec::{PluginExecutor, PluginInvocation};
use crate::errors::{DatabaseError, Result};
use crate::integrations::{
    ExclusionStoreTrait, Integration, IntegrationSpec, IntegrationStoreTrait,
    PhotoParameterStoreTrait,
};
use crate::photos::PhotoSnapshot;
use crate::plugins::PluginLoader;
use crate::runs::{RunCaller, RunResult};
use crate::utils::{env_template, kv_text};

/// Routes domain events to the integrations that should observe them.
///
/// Isolation rule: a failing executor invocation becomes a failed run record
/// and never stops iteration over the remaining integrations, nor does it
/// propagate to the router's caller.
pub struct DispatchRouter {
    integrations: Arc<dyn IntegrationStoreTrait>,
    exclusions: Arc<dyn ExclusionStoreTrait>,
    parameters: Arc<dyn PhotoParameterStoreTrait>,
    loader: Arc<PluginLoader>,
    http: HttpCallExecutor,
    plugins: PluginExecutor,
}

impl DispatchRouter {
    pub fn new(
        integrations: Arc<dyn IntegrationStoreTrait>,
        exclusions: Arc<dyn ExclusionStoreTrait>,
        parameters: Arc<dyn PhotoParameterStoreTrait>,
        loader: Arc<PluginLoader>,
        http: HttpCallExecutor,
        plugins: PluginExecutor,
    ) -> Self {
        DispatchRouter {
            integrations,
            exclusions,
            parameters,
            loader,
            http,
            plugins,
        }
    }

    /// Dispatches a coalesced global change to every active integration.
    ///
    /// HttpCall integrations respond only to global events; Plugin
    /// integrations must additionally pass their validity check.
    pub async fn dispatch_global(&self) -> Result<Vec<RunResult>> {
        let targets = self.integrations.get_active()?;

        let invocations = targets.into_iter().map(|integration| async move {
            match &integration.spec {
                IntegrationSpec::HttpCall(spec) => {
                    self.settle(
                        &integration,
                        self.http
                            .execute(&integration, spec, RunCaller::Scheduler)
                            .await,
                    )
                }
                IntegrationSpec::Plugin(spec) => {
                    if !self.loader.is_valid(&spec.module) {
                        log::debug!("Skipping invalid plugin integration {}", integration);
                        return None;
                    }
                    self.settle(
                        &integration,
                        self.plugins
                            .execute(
                                &integration,
                                spec,
                                PluginInvocation::GlobalChange,
                                RunCaller::Scheduler,
                            )
                            .await,
                    )
                }
            }
        });

        Ok(join_all(invocations).await.into_iter().flatten().collect())
    }

    /// Dispatches a photo-published event to the included plugins.
    pub async fn dispatch_photo_published(&self, photo: PhotoSnapshot) -> Result<Vec<RunResult>> {
        self.dispatch_photo_event(photo, false).await
    }

    /// Dispatches a photo-unpublished event to the included plugins.
    pub async fn dispatch_photo_unpublished(&self, photo: PhotoSnapshot) -> Result<Vec<RunResult>> {
        self.dispatch_photo_event(photo, true).await
    }

    async fn dispatch_photo_event(
        &self,
        photo: PhotoSnapshot,
        unpublish: bool,
    ) -> Result<Vec<RunResult>> {
        let excluded: HashSet<String> = self
            .exclusions
            .excluded_integration_ids(&photo.uuid)?
            .into_iter()
            .collect();

        // Active, valid plugins, minus this photo's exclusions
        let targets: Vec<Integration> = self
            .integrations
            .get_active()?
            .into_iter()
            .filter(|integration| !excluded.contains(&integration.id))
            .filter(|integration| match integration.plugin_module() {
                Some(module) => self.loader.is_valid(module),
                None => false,
            })
            .collect();

        let photo = &photo;
        let invocations = targets.into_iter().map(|integration| async move {
            let IntegrationSpec::Plugin(spec) = &integration.spec else {
                return None;
            };
            let params = self.photo_params(&integration.id, &photo.uuid);
            let invocation = if unpublish {
                PluginInvocation::PhotoUnpublish {
                    photo: photo.clone(),
                    params,
                }
            } else {
                PluginInvocation::PhotoPublish {
                    photo: photo.clone(),
                    params,
                }
            };
            self.settle(
                &integration,
                self.plugins
                    .execute(&integration, spec, invocation, RunCaller::Scheduler)
                    .await,
            )
        });

        Ok(join_all(invocations).await.into_iter().flatten().collect())
    }

    /// Operator-initiated run of one integration.
    ///
    /// Unlike automatic dispatch this surfaces problems: an unknown id and,
    /// for plugins, the specific validity failure, come back as errors
    /// instead of a silent no-op. The finalized record carries the full
    /// transcript.
    pub async fn run_manual(
        &self,
        integration_id: &str,
        invocation: Option<PluginInvocation>,
    ) -> Result<RunResult> {
        let integration = self.integrations.get_by_id(integration_id)?.ok_or_else(|| {
            DatabaseError::NotFound(format!("Integration {}", integration_id))
        })?;

        match &integration.spec {
            IntegrationSpec::HttpCall(spec) => {
                self.http.execute(&integration, spec, RunCaller::Manual).await
            }
            IntegrationSpec::Plugin(spec) => {
                // Fails with the precise PluginValidityError when invalid.
                self.loader.resolve(&spec.module)?;
                self.plugins
                    .execute(
                        &integration,
                        spec,
                        invocation.unwrap_or(PluginInvocation::GlobalChange),
                        RunCaller::Manual,
                    )
                    .await
            }
        }
    }

    /// Parameters for (integration, photo), parsed and env-expanded.
    ///
    /// Absent parameters yield an empty map. A stored block that fails to
    /// parse (it was validated on the way in) is treated the same, with a
    /// warning, rather than blocking the dispatch.
    fn photo_params(&self, integration_id: &str, photo_uuid: &str) -> BTreeMap<String, String> {
        let stored = match self.parameters.get(integration_id, photo_uuid) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!(
                    "Could not load photo parameters for integration {}: {}",
                    integration_id,
                    e
                );
                None
            }
        };
        let Some(record) = stored else {
            return BTreeMap::new();
        };
        match kv_text::parse_kv_block(&record.parameters) {
            Ok(params) => params
                .into_iter()
                .map(|(key, value)| (key, env_template::expand_env(&value)))
                .collect(),
            Err(e) => {
                log::warn!(
                    "Stored photo parameters for integration {} are malformed: {}",
                    integration_id,
                    e
                );
                BTreeMap::new()
            }
        }
    }

    /// Converts an executor outcome into an optional run record, logging
    /// store-level failures instead of propagating them.
    fn settle(&self, integration: &Integration, outcome: Result<RunResult>) -> Option<RunResult> {
        match outcome {
            Ok(run) => {
                if !run.successful {
                    log::warn!("Integration {} run {} failed", integration, run.id);
                }
                Some(run)
            }
            Err(e) => {
                log::error!("Integration {} could not be dispatched: {}", integration, e);
                None
            }
        }
    }
}
