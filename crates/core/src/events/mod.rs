//! Domain events consumed by the dispatch engine.

pub mod domain_event;
pub mod sink;

pub use domain_event::DomainEvent;
pub use sink::{ChannelEventSink, DomainEventSink, MockDomainEventSink, NoOpDomainEventSink};
