//! Event sink system for observability.
//!
//! Lifecycle events from the runner flow into an [`EventSink`]. The default
//! is [`NoOpEventSink`]; front ends typically use [`LoggingEventSink`].

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
