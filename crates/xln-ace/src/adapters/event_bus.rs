//! Adapts `shared-bus`'s in-process bus to the `AccountEventBus` outbound
//! port.

use crate::ports::outbound::AccountEventBus;
use async_trait::async_trait;
use shared_bus::{EventPublisher, InMemoryEventBus, XlnEvent};
use shared_types::AccountInput;
use std::sync::Arc;

pub struct BusAccountEventBus {
    bus: Arc<InMemoryEventBus>,
}

impl BusAccountEventBus {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl AccountEventBus for BusAccountEventBus {
    async fn send(&self, input: AccountInput) {
        self.bus.publish(XlnEvent::AccountMessage(input)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventFilter, EventTopic};
    use shared_types::{AccountFrameNak, AccountPair, EntityId};

    #[tokio::test]
    async fn send_publishes_onto_the_shared_bus() {
        let bus = Arc::new(InMemoryEventBus::new());
        let adapter = BusAccountEventBus::new(bus.clone());
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::AccountMessages]));

        let pair = AccountPair::new(EntityId([1; 32]), EntityId([2; 32]));
        adapter
            .send(AccountInput::Nak(AccountFrameNak {
                pair,
                height: 1,
                reason: "test".into(),
            }))
            .await;

        let received = sub.try_recv().unwrap().expect("event");
        assert!(matches!(received, XlnEvent::AccountMessage(AccountInput::Nak(_))));
    }
}
