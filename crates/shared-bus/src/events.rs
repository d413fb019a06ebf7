//! Event types that flow through the in-process bus: outbound account
//! wire messages, inbound chain observations, and tick-boundary state
//! notifications (spec §6.2, §6.4).

use serde::{Deserialize, Serialize};
use shared_types::{AccountInput, EntityId, Hash, JurisdictionEvent};

/// Everything the runtime scheduler publishes after a tick (spec §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum XlnEvent {
    /// An `AccountInput` produced by ACE for delivery to the counterparty
    /// entity instance (spec §6.4).
    AccountMessage(AccountInput),
    /// A chain observation consumed from `JurisdictionAdapter::subscribeEvents`
    /// (spec §4.4).
    Chain(JurisdictionEvent),
    /// `subscribeState(entityId)`: a lightweight tick-boundary notification
    /// (spec §6.2). Full `EntityState` is fetched separately through the
    /// runtime's query surface; the bus only carries the fact that it moved.
    EntityTick {
        entity_id: EntityId,
        height: u64,
        state_hash: Hash,
    },
}

impl XlnEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            XlnEvent::AccountMessage(_) => EventTopic::AccountMessages,
            XlnEvent::Chain(_) => EventTopic::ChainEvents,
            XlnEvent::EntityTick { .. } => EventTopic::EntityTicks,
        }
    }

    /// The entity this event is scoped to, when it is scoped to exactly one
    /// (a two-party `AccountInput` is scoped to both pair members instead).
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            XlnEvent::AccountMessage(_) => None,
            XlnEvent::Chain(ev) => Some(ev.entity_id()),
            XlnEvent::EntityTick { entity_id, .. } => Some(*entity_id),
        }
    }
}

/// Topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    AccountMessages,
    ChainEvents,
    EntityTicks,
    All,
}

/// Filter for subscribing to a subset of bus traffic.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Entities to include. Empty means all entities. Ignored for events
    /// with no single owning entity (`AccountMessage`).
    pub entity_ids: Vec<EntityId>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            entity_ids: Vec::new(),
        }
    }

    pub fn for_entity(entity_id: EntityId) -> Self {
        Self {
            topics: Vec::new(),
            entity_ids: vec![entity_id],
        }
    }

    pub fn matches(&self, event: &XlnEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let entity_match = self.entity_ids.is_empty()
            || event
                .entity_id()
                .map(|id| self.entity_ids.contains(&id))
                .unwrap_or(true);

        topic_match && entity_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(entity_id: EntityId) -> XlnEvent {
        XlnEvent::EntityTick {
            entity_id,
            height: 1,
            state_hash: [0; 32],
        }
    }

    #[test]
    fn filter_all_matches_everything() {
        let filter = EventFilter::all();
        assert!(filter.matches(&tick(EntityId([1; 32]))));
    }

    #[test]
    fn filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::ChainEvents]);
        assert!(!filter.matches(&tick(EntityId([1; 32]))));
    }

    #[test]
    fn filter_by_entity() {
        let mine = EntityId([1; 32]);
        let other = EntityId([2; 32]);
        let filter = EventFilter::for_entity(mine);
        assert!(filter.matches(&tick(mine)));
        assert!(!filter.matches(&tick(other)));
    }
}
