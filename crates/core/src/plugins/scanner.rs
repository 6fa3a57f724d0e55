//! Plugin directory scanner.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::constants::PLUGIN_MANIFEST_EXTENSION;
use crate::errors::Result;
use crate::integrations::{Integration, IntegrationSpec, IntegrationStoreTrait, PluginSpec};

/// Discovers candidate plugin modules and registers them as integrations.
///
/// New modules are always registered **inactive**: code appearing in the
/// plugin directory never gains execution rights until an operator enables
/// it. The scanner does not judge validity; that stays with the lazy check
/// at execution time.
pub struct PluginScanner {
    dir: PathBuf,
    integrations: Arc<dyn IntegrationStoreTrait>,
}

impl PluginScanner {
    pub fn new(dir: impl Into<PathBuf>, integrations: Arc<dyn IntegrationStoreTrait>) -> Self {
        PluginScanner {
            dir: dir.into(),
            integrations,
        }
    }

    /// Scans the plugin directory once and returns the newly created records.
    pub async fn scan(&self) -> Result<Vec<Integration>> {
        if !self.dir.is_dir() {
            log::warn!(
                "Plugin directory {} does not exist; nothing to scan",
                self.dir.display()
            );
            return Ok(Vec::new());
        }

        let known: HashSet<String> = self
            .integrations
            .get_plugin_modules()?
            .into_iter()
            .collect();

        let mut created = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PLUGIN_MANIFEST_EXTENSION) {
                continue;
            }
            let Some(module) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if known.contains(module) {
                continue;
            }

            let now = Utc::now().to_rfc3339();
            let integration = Integration {
                id: Uuid::new_v4().to_string(),
                nickname: module.to_string(),
                active: false,
                spec: IntegrationSpec::Plugin(PluginSpec {
                    module: module.to_string(),
                    config: String::new(),
                }),
                created_at: now.clone(),
                updated_at: now,
            };
            log::info!("Registering discovered plugin module '{}' (inactive)", module);
            created.push(self.integrations.insert(integration).await?);
        }
        Ok(created)
    }
}
