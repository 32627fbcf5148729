//! `entbridge-observability`
//!
//! **Responsibility:** one place that decides how entbridge processes emit
//! their `tracing` events.

/// Install the JSON subscriber for the `entbridge` binary and anything else
/// embedding the client. Later calls leave the first subscriber in place.
pub fn init() {
    tracing::init();
}

/// Subscriber installation and the default filter.
pub mod tracing;
