use config::{Config, DispatchMode};
use events::{EventBus, Publisher, QueuedDispatcher};
use log::info;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Builds what business services publish through, as selected by
/// `event_dispatch_mode`. Queued dispatch spawns its task on the current runtime.
pub fn init_event_publisher(config: &Config, event_bus: &Arc<EventBus>) -> Arc<dyn Publisher> {
    match config.event_dispatch_mode {
        DispatchMode::Sync => {
            info!("Publishing events synchronously");
            event_bus.clone()
        }
        DispatchMode::Queued => {
            let (dispatcher, _handle) =
                QueuedDispatcher::spawn(event_bus.clone(), config.event_queue_capacity);
            Arc::new(dispatcher)
        }
    }
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_bus: Arc<EventBus>,
    pub event_publisher: Arc<dyn Publisher>,
    pub live_manager: Arc<realtime::Manager>,
}

impl AppState {
    /// Creates the event bus, the publisher in front of it and the live
    /// connection manager, with the manager already subscribed to the bus.
    pub fn new(app_config: Config) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let event_publisher = init_event_publisher(&app_config, &event_bus);
        let live_manager = Arc::new(realtime::Manager::new(app_config.live_config()));
        live_manager.attach(&event_bus);

        Self {
            config: app_config,
            event_bus,
            event_publisher,
            live_manager,
        }
    }
}
