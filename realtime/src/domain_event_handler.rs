use crate::connection::ConnectionRegistry;
use async_trait::async_trait;
use events::{Event, EventHandler, EventType};
use log::*;
use std::sync::Arc;

/// Forwards published events to the live connections of the user each event
/// targets.
///
/// Subscribed once per live event type; the registry does the per-user
/// routing so connections of other users are never woken.
pub struct LiveEventHandler {
    registry: Arc<ConnectionRegistry>,
}

impl LiveEventHandler {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Event types streamed to clients.
    pub fn live_event_types() -> impl Iterator<Item = EventType> {
        EventType::ALL.into_iter().filter(EventType::is_live)
    }
}

#[async_trait]
impl EventHandler for LiveEventHandler {
    async fn handle_event(&self, event: &Event) -> Result<(), events::Error> {
        debug!(
            "Forwarding {} event to live connections of {:?}",
            event.event_type(),
            event.user_id()
        );
        self.registry.dispatch(event).await;
        Ok(())
    }
}
