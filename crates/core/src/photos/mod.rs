//! Read-only view of the photo library.
//!
//! The dispatch engine never mutates photos; it consumes serialized
//! snapshots carried on domain events and a handful of read-only lookups.

pub mod model;
pub mod traits;

pub use model::PhotoSnapshot;
pub use traits::PhotoReadStoreTrait;
