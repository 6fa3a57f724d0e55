//! The plugin ABI: the trait every plugin implements and the constructor
//! signature the registry stores.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::photos::PhotoSnapshot;
use crate::plugins::services::PluginServices;

/// Error raised by plugin code at construction or handler time.
///
/// Whatever a plugin raises is captured into a failed run record; it never
/// escapes the executor.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct PluginError(pub String);

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        PluginError(message.into())
    }
}

impl From<crate::errors::Error> for PluginError {
    fn from(err: crate::errors::Error) -> Self {
        PluginError(err.to_string())
    }
}

/// Everything a plugin receives at construction time.
pub struct PluginContext {
    /// Config block of the integration, parsed and env-expanded.
    pub config: BTreeMap<String, String>,
    /// Host services: namespaced kv storage, photo assets, logging.
    pub services: PluginServices,
}

/// The handler interface of a plugin.
///
/// Handlers default to no-ops so a plugin only implements the events it
/// cares about. Handlers receive read-only snapshots; there is no path from
/// a plugin back into library storage.
#[async_trait]
pub trait PhotoPlugin: Send {
    /// Called after any change across the library's model types.
    async fn on_global_change(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called when a photo is published.
    async fn on_photo_publish(
        &mut self,
        _photo: &PhotoSnapshot,
        _params: &BTreeMap<String, String>,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called when a photo is unpublished.
    async fn on_photo_unpublish(
        &mut self,
        _photo: &PhotoSnapshot,
        _params: &BTreeMap<String, String>,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Constructor signature stored in the registry.
///
/// One registered factory per entry key; a manifest's `entry` resolving to
/// exactly one factory is part of the plugin's validity.
pub type PluginFactory = fn(PluginContext) -> Result<Box<dyn PhotoPlugin>, PluginError>;
