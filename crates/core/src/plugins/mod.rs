//! In-process plugin units and their ABI.
//!
//! A plugin is addressed by a *module*: a JSON manifest file in the
//! configured plugin directory declaring the plugin's identity and pointing,
//! via its `entry` key, at a constructor registered in the
//! [`PluginRegistry`]. Manifests are re-read on every invocation, so on-disk
//! edits take effect without a restart.

pub mod abi;
pub mod builtin;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod scanner;
pub mod services;

pub use abi::{PhotoPlugin, PluginContext, PluginError, PluginFactory};
pub use loader::{LoadedPlugin, PluginLoader};
pub use manifest::{PluginManifest, PluginValidityError};
pub use registry::PluginRegistry;
pub use scanner::PluginScanner;
pub use services::{PluginKvStoreTrait, PluginLogger, PluginServices, ScopedKv};
