use domain::memory::{MemoryGoalStore, MemoryUserStore};
use domain::{GoalService, UserService};
use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting up in {} mode with {} event dispatch...",
        config.runtime_env(),
        config.event_dispatch_mode
    );

    if config.jwt_secret().is_none() {
        error!("JWT_SECRET is not set, live connections cannot be authenticated");
        std::process::exit(1);
    }

    let app_state = AppState::new(config);

    let users = Arc::new(UserService::new(
        Arc::new(MemoryUserStore::default()),
        app_state.event_publisher.clone(),
    ));
    let goals = Arc::new(GoalService::new(
        Arc::new(MemoryGoalStore::new()),
        app_state.event_publisher.clone(),
    ));
    domain::register_handlers(&app_state.event_bus, users, goals);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        std::process::exit(1);
    }
}
