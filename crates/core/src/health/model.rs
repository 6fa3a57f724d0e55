use serde::{Deserialize, Serialize};

/// Derived health figures for the photo library.
///
/// A fully processed library has one rendered variant per (photo, size)
/// pair; the pending figures measure the distance from that state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryHealth {
    /// Total number of photos in the library.
    pub total_photos: i64,
    /// Photos missing at least one size variant.
    pub photos_pending_sizes: i64,
    /// Size variants still to be rendered across all photos.
    pub pending_sizes: i64,
}

impl LibraryHealth {
    /// True when every photo has every size variant.
    pub fn is_fully_rendered(&self) -> bool {
        self.pending_sizes == 0
    }
}
