use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::health::model::LibraryHealth;
use crate::photos::PhotoReadStoreTrait;

/// Computes the library health report from the read model.
pub struct LibraryHealthService {
    photos: Arc<dyn PhotoReadStoreTrait>,
}

impl LibraryHealthService {
    pub fn new(photos: Arc<dyn PhotoReadStoreTrait>) -> Self {
        LibraryHealthService { photos }
    }

    pub fn report(&self) -> Result<LibraryHealth> {
        let total_photos = self.photos.photo_count()?;
        let total_sizes = self.photos.size_count()?;
        let size_counts = self.photos.photo_size_counts()?;
        Ok(compute(total_photos, total_sizes, &size_counts))
    }
}

/// Pure computation of the health figures.
///
/// `size_counts` maps photo id to its number of rendered variants; photos
/// with none are absent from the map.
fn compute(
    total_photos: i64,
    total_sizes: i64,
    size_counts: &HashMap<String, i64>,
) -> LibraryHealth {
    let rendered: i64 = size_counts.values().sum();
    let photos_with_all: i64 = size_counts
        .values()
        .filter(|&&count| count >= total_sizes)
        .count() as i64;

    LibraryHealth {
        total_photos,
        photos_pending_sizes: total_photos - photos_with_all,
        pending_sizes: total_photos * total_sizes - rendered,
    }
}
