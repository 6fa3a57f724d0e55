//! Registry mapping stable entry keys to plugin constructors.

use std::collections::HashMap;

use crate::errors::{Result, ValidationError};
use crate::plugins::abi::PluginFactory;
use crate::plugins::builtin;

/// Maps stable entry keys to plugin constructor functions.
///
/// A manifest's `entry` must resolve here to exactly one constructor for the
/// plugin to be valid. Registration happens once at startup; lookups are
/// read-only afterwards, so the registry can be shared behind an `Arc`.
pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        PluginRegistry {
            factories: HashMap::new(),
        }
    }

    /// A registry with the built-in constructors registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register(builtin::PHOTO_LOGGER_ENTRY, builtin::photo_logger)
            .unwrap_or_else(|_| unreachable!("builtin keys are distinct"));
        registry
    }

    /// Registers a constructor under a stable key.
    ///
    /// Registering the same key twice is an error; two constructors for one
    /// entry would make every module naming it ambiguous.
    pub fn register(&mut self, key: &str, factory: PluginFactory) -> Result<()> {
        if self.factories.contains_key(key) {
            return Err(ValidationError::InvalidInput(format!(
                "Plugin entry '{}' is already registered",
                key
            ))
            .into());
        }
        self.factories.insert(key.to_string(), factory);
        Ok(())
    }

    /// Looks up the constructor for an entry key.
    pub fn get(&self, key: &str) -> Option<PluginFactory> {
        self.factories.get(key).copied()
    }

    /// Registered entry keys, for diagnostics.
    pub fn keys(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::abi::{PluginContext, PluginError};
    use crate::plugins::PhotoPlugin;

    fn noop_factory(_ctx: PluginContext) -> std::result::Result<Box<dyn PhotoPlugin>, PluginError> {
        struct Noop;
        impl PhotoPlugin for Noop {}
        Ok(Box::new(Noop))
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = PluginRegistry::with_builtins();
        assert!(registry.get(builtin::PHOTO_LOGGER_ENTRY).is_some());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = PluginRegistry::new();
        registry.register("custom", noop_factory).unwrap();
        assert!(registry.register("custom", noop_factory).is_err());
    }

    #[test]
    fn test_unknown_key_is_none() {
        let registry = PluginRegistry::new();
        assert!(registry.get("nope").is_none());
    }
}
