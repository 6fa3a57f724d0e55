//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::photos::PhotoSnapshot;

/// Domain events emitted by the photo library after successful mutations.
///
/// These events are facts about library changes. The dispatch engine is the
/// sole consumer; it translates them into integration invocations. The set of
/// producers and consumers is statically enumerable: everything funnels
/// through one [`DomainEventSink`](super::DomainEventSink) into one queue.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Any create/update/delete across the library's model types.
    ///
    /// Intentionally carries no payload: bursts of these are coalesced and
    /// only the settled state matters to subscribers.
    GlobalChange,

    /// A photo became publicly visible.
    PhotoPublished { photo: PhotoSnapshot },

    /// A photo was withdrawn from public visibility.
    PhotoUnpublished { photo: PhotoSnapshot },
}

impl DomainEvent {
    /// Creates a PhotoPublished event.
    pub fn photo_published(photo: PhotoSnapshot) -> Self {
        Self::PhotoPublished { photo }
    }

    /// Creates a PhotoUnpublished event.
    pub fn photo_unpublished(photo: PhotoSnapshot) -> Self {
        Self::PhotoUnpublished { photo }
    }
}
