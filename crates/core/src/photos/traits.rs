//! Read-only store trait over the photo library.

use std::collections::HashMap;

use crate::errors::Result;

/// Read-only access to library data the engine consumes.
///
/// Counts feed the library health report; asset lookups back the plugin
/// services handle. Implementations must never expose write paths here.
pub trait PhotoReadStoreTrait: Send + Sync {
    /// Total number of photos in the library.
    fn photo_count(&self) -> Result<i64>;

    /// Total number of configured size variants.
    fn size_count(&self) -> Result<i64>;

    /// Number of rendered size variants per photo id.
    ///
    /// Photos with no rendered variants are absent from the map.
    fn photo_size_counts(&self) -> Result<HashMap<String, i64>>;

    /// Bytes of the rendered asset for (photo uuid, size slug), if present.
    fn photo_asset(&self, photo_uuid: &str, size_slug: &str) -> Result<Option<Vec<u8>>>;
}
