use crate::connection::{ConnectionRegistry, Registration};
use crate::domain_event_handler::LiveEventHandler;
use crate::live_connection::LiveConnection;
use crate::queue::OverflowPolicy;
use crate::transport::TransportKind;
use events::{EventBus, EventHandler, Id};
use log::*;
use std::sync::Arc;

pub const DEFAULT_SSE_QUEUE_CAPACITY: usize = 10;
pub const DEFAULT_WS_QUEUE_CAPACITY: usize = 256;

/// Per-transport queue sizing and the policy applied when a queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveConfig {
    pub sse_queue_capacity: usize,
    pub ws_queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
}

impl LiveConfig {
    pub fn queue_capacity(&self, kind: TransportKind) -> usize {
        match kind {
            TransportKind::Sse => self.sse_queue_capacity,
            TransportKind::WebSocket => self.ws_queue_capacity,
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            sse_queue_capacity: DEFAULT_SSE_QUEUE_CAPACITY,
            ws_queue_capacity: DEFAULT_WS_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

pub struct Manager {
    config: LiveConfig,
    registry: Arc<ConnectionRegistry>,
}

impl Manager {
    pub fn new(config: LiveConfig) -> Self {
        Self {
            config,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Create and register a connection for `user_id`. Start its delivery loop
    /// with [`LiveConnection::run`], handing it the returned registration.
    pub fn open(&self, user_id: Id, kind: TransportKind) -> (Arc<LiveConnection>, Registration) {
        let connection = Arc::new(LiveConnection::new(
            user_id,
            kind,
            self.config.queue_capacity(kind),
            self.config.overflow_policy,
        ));
        let registration = self.registry.register(connection.clone());
        info!(
            "Registered new {kind} connection {} for user {user_id}",
            connection.id()
        );
        (connection, registration)
    }

    /// Subscribe the registry to every live event type on `bus`.
    pub fn attach(&self, bus: &EventBus) -> Arc<dyn EventHandler> {
        let handler: Arc<dyn EventHandler> =
            Arc::new(LiveEventHandler::new(self.registry.clone()));
        for event_type in LiveEventHandler::live_event_types() {
            bus.subscribe(event_type, handler.clone());
        }
        handler
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// Close every open connection. Their delivery loops end and clean up.
    pub fn shutdown(&self) {
        self.registry.close_all();
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(LiveConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{xp_event, xp_of, ChannelTransport};
    use events::{EventType, Publisher};
    use std::time::Duration;

    #[test]
    fn queue_capacity_depends_on_the_transport() {
        let manager = Manager::default();
        let (sse, _a) = manager.open(Id::new_v4(), TransportKind::Sse);
        let (ws, _b) = manager.open(Id::new_v4(), TransportKind::WebSocket);

        assert_eq!(manager.connection_count(), 2);
        assert_eq!(manager.config().queue_capacity(sse.kind()), 10);
        assert_eq!(manager.config().queue_capacity(ws.kind()), 256);
    }

    #[test]
    fn attach_subscribes_each_live_type_once() {
        let manager = Manager::default();
        let bus = EventBus::new();
        let handler = manager.attach(&bus);

        for event_type in EventType::ALL {
            assert_eq!(bus.is_subscribed(event_type, &handler), event_type.is_live());
        }
        assert_eq!(bus.subscriber_count(EventType::XpUpdated), 1);
    }

    #[tokio::test]
    async fn published_events_stream_to_the_owners_connection() {
        let manager = Manager::default();
        let bus = EventBus::new();
        manager.attach(&bus);

        let user_id = Id::new_v4();
        let (connection, registration) = manager.open(user_id, TransportKind::WebSocket);
        let (transport, mut delivered) = ChannelTransport::new();
        let loop_handle = tokio::spawn(connection.run(transport, registration));

        bus.publish(xp_event(Id::new_v4(), 1)).await;
        bus.publish(xp_event(user_id, 2)).await;

        let event = tokio::time::timeout(Duration::from_secs(5), delivered.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(xp_of(&event), 2);
        assert!(event.is_for(user_id));

        manager.shutdown();
        tokio::time::timeout(Duration::from_secs(5), loop_handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(manager.connection_count(), 0);
    }
}
