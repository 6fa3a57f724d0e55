/// Debounce key for the coalesced "anything changed" event class.
pub const GLOBAL_CHANGE_EVENT_KEY: &str = "global-integrations";

/// File extension of plugin module manifests.
pub const PLUGIN_MANIFEST_EXTENSION: &str = "json";

/// Size slug of the untouched upload, always present for a fully processed photo.
pub const ORIGINAL_SIZE_SLUG: &str = "original";
