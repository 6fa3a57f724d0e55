//! Plugin module manifests.
//!
//! A manifest carries the four required constants every plugin module must
//! expose (`name`, `uuid`, `version`, `configSchema`) plus the `entry` key
//! naming its registered constructor. Missing pieces are reported
//! field-by-field so a manual test run can tell the operator exactly what is
//! wrong.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a plugin module failed its validity check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginValidityError {
    #[error("Plugin module '{0}' not found")]
    ModuleNotFound(String),

    #[error("Plugin manifest could not be read: {0}")]
    Unreadable(String),

    #[error("Plugin manifest is not valid JSON: {0}")]
    Malformed(String),

    #[error("Plugin manifest is missing required field '{0}'")]
    MissingConstant(&'static str),

    #[error("Plugin entry '{0}' does not name a registered constructor")]
    UnknownEntry(String),
}

/// A parsed, complete plugin manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    /// Human-readable plugin name.
    pub name: String,
    /// Stable plugin identity; namespaces the plugin's persistent storage.
    pub uuid: String,
    /// Version string, informational.
    pub version: String,
    /// Config keys the plugin understands, with descriptions.
    pub config_schema: BTreeMap<String, String>,
    /// Per-photo parameter keys the plugin understands, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_parameter_schema: Option<BTreeMap<String, String>>,
    /// Registry key of the plugin's constructor.
    pub entry: String,
}

/// Loosely-typed mirror used to report missing fields precisely instead of
/// bubbling a serde message.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    name: Option<String>,
    uuid: Option<String>,
    version: Option<String>,
    config_schema: Option<BTreeMap<String, String>>,
    #[serde(default)]
    photo_parameter_schema: Option<BTreeMap<String, String>>,
    entry: Option<String>,
}

impl PluginManifest {
    /// Parses manifest JSON, reporting the first missing required constant.
    pub fn parse(text: &str) -> Result<Self, PluginValidityError> {
        let raw: RawManifest = serde_json::from_str(text)
            .map_err(|e| PluginValidityError::Malformed(e.to_string()))?;

        Ok(PluginManifest {
            name: raw
                .name
                .ok_or(PluginValidityError::MissingConstant("name"))?,
            uuid: raw
                .uuid
                .ok_or(PluginValidityError::MissingConstant("uuid"))?,
            version: raw
                .version
                .ok_or(PluginValidityError::MissingConstant("version"))?,
            config_schema: raw
                .config_schema
                .ok_or(PluginValidityError::MissingConstant("configSchema"))?,
            photo_parameter_schema: raw.photo_parameter_schema,
            entry: raw
                .entry
                .ok_or(PluginValidityError::MissingConstant("entry"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_manifest() -> String {
        serde_json::json!({
            "name": "Example Plugin",
            "uuid": "00000000-0000-0000-0000-000000000000",
            "version": "1.0.0",
            "configSchema": {
                "api_key": "An API key for an external service (can use ${ENV_VAR})"
            },
            "entry": "photo-logger"
        })
        .to_string()
    }

    #[test]
    fn test_parse_complete_manifest() {
        let manifest = PluginManifest::parse(&complete_manifest()).unwrap();
        assert_eq!(manifest.name, "Example Plugin");
        assert_eq!(manifest.entry, "photo-logger");
        assert!(manifest.photo_parameter_schema.is_none());
        assert!(manifest.config_schema.contains_key("api_key"));
    }

    #[test]
    fn test_missing_constant_is_named() {
        let json = r#"{"name": "X", "version": "1.0.0", "configSchema": {}, "entry": "e"}"#;
        assert_eq!(
            PluginManifest::parse(json).unwrap_err(),
            PluginValidityError::MissingConstant("uuid")
        );
    }

    #[test]
    fn test_malformed_json_is_reported() {
        match PluginManifest::parse("{not json").unwrap_err() {
            PluginValidityError::Malformed(_) => {}
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_photo_parameter_schema_is_optional() {
        let json = serde_json::json!({
            "name": "X",
            "uuid": "u",
            "version": "1",
            "configSchema": {},
            "photoParameterSchema": {"caption": "Caption override"},
            "entry": "e"
        })
        .to_string();
        let manifest = PluginManifest::parse(&json).unwrap();
        assert!(manifest
            .photo_parameter_schema
            .unwrap()
            .contains_key("caption"));
    }
}
