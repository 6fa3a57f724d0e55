//! Host services handed to plugins.
//!
//! A plugin gets three capabilities: persistent key-value storage
//! automatically namespaced by its uuid, read-only retrieval of rendered
//! photo assets, and a logger whose entire output lands in the run
//! transcript.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::photos::PhotoReadStoreTrait;
use crate::plugins::abi::PluginError;
use crate::runs::RunLog;

/// Store trait for the plugins' persistent key-value rows.
#[async_trait]
pub trait PluginKvStoreTrait: Send + Sync {
    /// Get a stored value by its full (already namespaced) key.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value by its full key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Key-value view namespaced by plugin uuid.
///
/// Plugins only ever see their own keys; two plugins storing `last_seen` do
/// not collide.
#[derive(Clone)]
pub struct ScopedKv {
    plugin_uuid: String,
    store: Arc<dyn PluginKvStoreTrait>,
}

impl ScopedKv {
    pub fn new(plugin_uuid: impl Into<String>, store: Arc<dyn PluginKvStoreTrait>) -> Self {
        ScopedKv {
            plugin_uuid: plugin_uuid.into(),
            store,
        }
    }

    fn scoped_key(&self, key: &str) -> String {
        format!("{}_{}", self.plugin_uuid, key)
    }

    pub fn get(&self, key: &str) -> std::result::Result<Option<String>, PluginError> {
        self.store.get(&self.scoped_key(key)).map_err(Into::into)
    }

    pub async fn set(&self, key: &str, value: &str) -> std::result::Result<(), PluginError> {
        self.store
            .set(&self.scoped_key(key), value)
            .await
            .map_err(Into::into)
    }
}

/// Logger handed to a plugin.
///
/// Every line is captured into the run transcript and forwarded to the
/// process log with the plugin name as context - not just failures, so the
/// transcript shows what a run actually did.
#[derive(Clone)]
pub struct PluginLogger {
    plugin: String,
    log: RunLog,
}

impl PluginLogger {
    pub fn new(plugin: impl Into<String>, log: RunLog) -> Self {
        PluginLogger {
            plugin: plugin.into(),
            log,
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.log.line(format!("INFO  {}", message));
        log::info!("[plugin {}] {}", self.plugin, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.log.line(format!("WARN  {}", message));
        log::warn!("[plugin {}] {}", self.plugin, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.log.line(format!("ERROR {}", message));
        log::error!("[plugin {}] {}", self.plugin, message);
    }
}

/// The services bundle passed to a plugin constructor.
#[derive(Clone)]
pub struct PluginServices {
    kv: ScopedKv,
    photos: Arc<dyn PhotoReadStoreTrait>,
    logger: PluginLogger,
}

impl PluginServices {
    pub fn new(kv: ScopedKv, photos: Arc<dyn PhotoReadStoreTrait>, logger: PluginLogger) -> Self {
        PluginServices { kv, photos, logger }
    }

    /// The plugin's namespaced persistent storage.
    pub fn kv(&self) -> &ScopedKv {
        &self.kv
    }

    /// The plugin's transcript-capturing logger.
    pub fn logger(&self) -> &PluginLogger {
        &self.logger
    }

    /// Bytes of a rendered photo asset, or None when the photo or the size
    /// variant does not exist.
    pub fn photo_asset(
        &self,
        photo_uuid: &str,
        size_slug: &str,
    ) -> std::result::Result<Option<Vec<u8>>, PluginError> {
        self.photos
            .photo_asset(photo_uuid, size_slug)
            .map_err(Into::into)
    }
}
