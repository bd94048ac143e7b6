use crate::{Event, EventHandler, EventType, Publisher};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::FutureExt;
use log::*;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Registry of handlers per event type.
///
/// Handlers for a type are called in subscription order, sequentially, on the
/// publishing task. The handler list is copied out of the map before any
/// handler runs, so handlers may subscribe, unsubscribe or publish themselves.
pub struct EventBus {
    subscribers: DashMap<EventType, Vec<Arc<dyn EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Appends `handler` to the list for `event_type`. Subscribing the same
    /// handler twice delivers every event to it twice.
    pub fn subscribe(&self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        self.subscribers
            .entry(event_type)
            .or_default()
            .push(handler);
        debug!("Subscribed handler to {event_type} events");
    }

    /// Removes the first subscription of `handler` to `event_type`, if any.
    pub fn unsubscribe(&self, event_type: EventType, handler: &Arc<dyn EventHandler>) {
        if let Some(mut handlers) = self.subscribers.get_mut(&event_type) {
            if let Some(position) = handlers.iter().position(|h| same_handler(h, handler)) {
                handlers.remove(position);
                debug!("Unsubscribed handler from {event_type} events");
            }
        }
    }

    pub fn is_subscribed(&self, event_type: EventType, handler: &Arc<dyn EventHandler>) -> bool {
        self.subscribers
            .get(&event_type)
            .is_some_and(|handlers| handlers.iter().any(|h| same_handler(h, handler)))
    }

    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.subscribers
            .get(&event_type)
            .map_or(0, |handlers| handlers.len())
    }

    /// Delivers `event` to every handler subscribed to its type.
    ///
    /// An unregistered type is a no-op. A handler that errors or panics is
    /// logged and skipped; the remaining handlers still run.
    pub async fn dispatch(&self, event: &Event) {
        let event_type = event.event_type();
        let handlers = match self.subscribers.get(&event_type) {
            Some(handlers) => handlers.value().clone(),
            None => {
                trace!("No subscribers for {event_type} event");
                return;
            }
        };

        for (position, handler) in handlers.iter().enumerate() {
            match AssertUnwindSafe(handler.handle_event(event))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Subscriber #{position} failed to handle {event_type} event: {e}");
                }
                Err(panic) => {
                    error!(
                        "Subscriber #{position} panicked while handling {event_type} event: {}",
                        panic_message(panic.as_ref())
                    );
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for EventBus {
    async fn publish(&self, event: Event) {
        self.dispatch(&event).await;
    }
}

fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
