//! The publishing side of the in-process event bus.

use crate::events::{EventFilter, XlnEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Interface the runtime scheduler uses to emit tick-boundary events
/// (spec §5, §6.2).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: XlnEvent) -> usize;
    fn events_published(&self) -> u64;
}

/// Single-process, single-node bus. A distributed deployment would swap this
/// for a networked transport behind the same `EventPublisher`/`EventSubscriber`
/// traits; the core never depends on the concrete bus.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<XlnEvent>,
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = format!("{:?}/{:?}", filter.topics, filter.entity_ids);

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(topic_key.clone()).or_insert(0) += 1;
        }

        debug!(topics = ?filter.topics, "new subscription");
        Subscription::new(receiver, filter, self.subscriptions.clone(), topic_key)
    }

    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: XlnEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(topic = ?topic, receivers = receiver_count, "event published");
                receiver_count
            }
            Err(e) => {
                warn!(topic = ?topic, error = %e, "event dropped, no receivers");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use shared_types::EntityId;

    fn tick() -> XlnEvent {
        XlnEvent::EntityTick {
            entity_id: EntityId([1; 32]),
            height: 1,
            state_hash: [0; 32],
        }
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_counted_but_dropped() {
        let bus = InMemoryEventBus::new();
        let receivers = bus.publish(tick()).await;
        assert_eq!(receivers, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let bus = InMemoryEventBus::new();
        let _sub = bus.subscribe(EventFilter::all());
        let receivers = bus.publish(tick()).await;
        assert_eq!(receivers, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn multiple_subscribers_all_receive() {
        let bus = InMemoryEventBus::new();
        let _a = bus.subscribe(EventFilter::all());
        let _b = bus.subscribe(EventFilter::all());
        let _c = bus.subscribe(EventFilter::topics(vec![EventTopic::ChainEvents]));
        assert_eq!(bus.publish(tick()).await, 3);
    }

    #[test]
    fn custom_capacity_is_reported() {
        let bus = InMemoryEventBus::with_capacity(64);
        assert_eq!(bus.capacity(), 64);
    }
}
