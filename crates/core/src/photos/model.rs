use serde::{Deserialize, Serialize};

/// Read-only serialized snapshot of a photo, matching the public API shape.
///
/// This is what plugin handlers receive; it reflects the photo at the moment
/// the event was emitted and cannot be used to reach back into storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSnapshot {
    pub uuid: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub albums: Vec<String>,
}

impl PhotoSnapshot {
    /// Minimal snapshot for tests and examples.
    pub fn sample(uuid: &str, title: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            description: None,
            publish_date: None,
            tags: Vec::new(),
            albums: Vec::new(),
        }
    }
}
