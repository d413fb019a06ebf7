//! # Shared Bus
//!
//! In-process publish/subscribe bus carrying outbound `AccountInput`
//! messages, inbound `JurisdictionEvent` chain observations, and
//! tick-boundary state notifications between the runtime scheduler and
//! whatever UI or adapter is observing it (spec §5, §6.2, §6.4).
//!
//! A distributed deployment would implement `EventPublisher`/
//! `EventSubscriber` over a networked transport; the core never depends on
//! the concrete bus, only on these traits.

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, XlnEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Events to buffer per subscriber before a lagged subscriber starts
/// dropping events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_reasonable() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
