//! Module resolution with hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constants::PLUGIN_MANIFEST_EXTENSION;
use crate::plugins::abi::PluginFactory;
use crate::plugins::manifest::{PluginManifest, PluginValidityError};
use crate::plugins::registry::PluginRegistry;

/// A module that passed its validity check: manifest plus constructor.
#[derive(Debug)]
pub struct LoadedPlugin {
    pub manifest: PluginManifest,
    pub factory: PluginFactory,
}

/// Resolves module references to loaded plugins.
///
/// Resolution reads the manifest from disk on *every* call: editing or
/// deleting a manifest takes effect on the next invocation without a process
/// restart. Validity is therefore never cached.
pub struct PluginLoader {
    dir: PathBuf,
    registry: Arc<PluginRegistry>,
}

impl PluginLoader {
    pub fn new(dir: impl Into<PathBuf>, registry: Arc<PluginRegistry>) -> Self {
        PluginLoader {
            dir: dir.into(),
            registry,
        }
    }

    /// The manifest path a module reference resolves to.
    pub fn manifest_path(&self, module: &str) -> PathBuf {
        self.dir
            .join(module)
            .with_extension(PLUGIN_MANIFEST_EXTENSION)
    }

    /// Resolves a module fresh from disk.
    ///
    /// A module is valid iff its manifest file exists, parses, carries all
    /// required constants, and its `entry` names exactly one registered
    /// constructor.
    pub fn resolve(&self, module: &str) -> Result<LoadedPlugin, PluginValidityError> {
        let path = self.manifest_path(module);
        if !path.exists() {
            return Err(PluginValidityError::ModuleNotFound(module.to_string()));
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| PluginValidityError::Unreadable(e.to_string()))?;
        let manifest = PluginManifest::parse(&text)?;
        let factory = self
            .registry
            .get(&manifest.entry)
            .ok_or_else(|| PluginValidityError::UnknownEntry(manifest.entry.clone()))?;
        Ok(LoadedPlugin { manifest, factory })
    }

    /// The lazy `valid` check: true iff [`resolve`](Self::resolve) succeeds.
    pub fn is_valid(&self, module: &str) -> bool {
        self.resolve(module).is_ok()
    }

    /// Directory this loader resolves modules against.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
