use crate::connection::{ConnectionId, Registration};
use crate::queue::{EventQueue, OverflowPolicy, PushOutcome};
use crate::transport::{Transport, TransportKind};
use async_trait::async_trait;
use events::{Event, EventHandler, Id};
use log::*;
use std::sync::Arc;

/// One client session streaming its owner's events over SSE or WebSocket.
///
/// Dispatch only ever enqueues; the delivery loop started by [`LiveConnection::run`]
/// is the single writer to the transport.
pub struct LiveConnection {
    id: ConnectionId,
    user_id: Id,
    kind: TransportKind,
    queue: EventQueue,
}

impl LiveConnection {
    pub fn new(user_id: Id, kind: TransportKind, capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            kind,
            queue: EventQueue::new(capacity, policy),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn user_id(&self) -> Id {
        self.user_id
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Events waiting for the delivery loop.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Events discarded by the overflow policy since the connection opened.
    pub fn dropped_events(&self) -> u64 {
        self.queue.dropped()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Stops the delivery loop and discards anything still queued.
    pub fn close(&self) {
        self.queue.close();
    }

    /// Delivery loop. Writes queued events to `transport` in order until the
    /// peer goes away, a write fails or the connection is closed. The
    /// transport is then closed and `registration` dropped, which removes the
    /// connection from the registry.
    pub async fn run<T: Transport>(self: Arc<Self>, mut transport: T, registration: Registration) {
        info!(
            "{} connection {} for user {} streaming",
            self.kind, self.id, self.user_id
        );
        let mut delivered: u64 = 0;

        loop {
            let next = tokio::select! {
                _ = transport.closed() => {
                    debug!("{} peer of connection {} went away", self.kind, self.id);
                    None
                }
                event = self.queue.pop() => event,
            };

            let Some(event) = next else {
                break;
            };

            if let Err(e) = transport.send(&event).await {
                warn!(
                    "Writing {} event to {} connection {} failed: {e}",
                    event.event_type(),
                    self.kind,
                    self.id
                );
                break;
            }
            delivered += 1;
            trace!("Delivered {} event on connection {}", event.event_type(), self.id);
        }

        transport.close().await;
        self.queue.close();
        drop(registration);

        info!(
            "{} connection {} for user {} closed ({delivered} delivered, {} dropped)",
            self.kind,
            self.id,
            self.user_id,
            self.dropped_events()
        );
    }
}

#[async_trait]
impl EventHandler for LiveConnection {
    async fn handle_event(&self, event: &Event) -> Result<(), events::Error> {
        if !event.is_for(self.user_id) {
            return Ok(());
        }

        match self.queue.push(event.clone()).await {
            PushOutcome::Queued => {}
            PushOutcome::DroppedOldest => warn!(
                "Queue full on connection {}, dropped its oldest event for {} ({} dropped so far)",
                self.id,
                event.event_type(),
                self.dropped_events()
            ),
            PushOutcome::DroppedNewest => warn!(
                "Queue full on connection {}, dropped {} event ({} dropped so far)",
                self.id,
                event.event_type(),
                self.dropped_events()
            ),
            PushOutcome::Closed => {
                trace!("Connection {} closed, {} event discarded", self.id, event.event_type())
            }
        }
        Ok(())
    }
}
