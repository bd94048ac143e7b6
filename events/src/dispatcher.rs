use crate::error::{Error, EventErrorKind};
use crate::{Event, EventBus, Publisher};
use async_trait::async_trait;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

tokio::task_local! {
    static ON_DISPATCH_TASK: ();
}

/// Publisher that hands events to a dedicated dispatch task through a bounded
/// queue, so the publishing operation does not wait on handlers.
///
/// Events are dispatched one at a time in the order they were queued. When
/// the queue is full, `publish` waits for room. Handlers running on the
/// dispatch task that publish again are dispatched inline instead of queued.
#[derive(Clone)]
pub struct QueuedDispatcher {
    bus: Arc<EventBus>,
    sender: mpsc::Sender<Event>,
}

impl QueuedDispatcher {
    /// Starts the dispatch task. It runs until every clone of the returned
    /// dispatcher has been dropped and the queue is drained.
    pub fn spawn(bus: Arc<EventBus>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<Event>(capacity.max(1));
        let dispatch_bus = Arc::clone(&bus);

        let handle = tokio::spawn(ON_DISPATCH_TASK.scope((), async move {
            while let Some(event) = receiver.recv().await {
                dispatch_bus.dispatch(&event).await;
            }
            debug!("Event dispatch queue closed, dispatcher stopping");
        }));

        info!("Started queued event dispatcher with capacity {}", capacity.max(1));
        (Self { bus, sender }, handle)
    }

    /// Queues `event`, or dispatches it inline when called from the dispatch task.
    pub async fn enqueue(&self, event: Event) -> Result<(), Error> {
        if ON_DISPATCH_TASK.try_with(|_| ()).is_ok() {
            self.bus.dispatch(&event).await;
            return Ok(());
        }

        self.sender.send(event).await.map_err(|_| Error {
            source: None,
            error_kind: EventErrorKind::DispatcherClosed,
        })
    }
}

#[async_trait]
impl Publisher for QueuedDispatcher {
    async fn publish(&self, event: Event) {
        let event_type = event.event_type();
        if let Err(e) = self.enqueue(event).await {
            error!("Dropping {event_type} event: {e}");
        }
    }
}
