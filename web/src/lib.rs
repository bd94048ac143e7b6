use log::*;
use service::AppState;
use std::future::Future;
use std::io;
use tokio::net::TcpListener;

mod controller;
mod error;
mod extractors;
mod router;
mod sse;
mod ws;


pub use error::{Error, Result};
pub use router::define_routes;

/// Binds the configured interface and port and serves until SIGINT or SIGTERM.
pub async fn init_server(app_state: AppState) -> io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{host}:{}", app_state.config.port);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    serve(listener, app_state, shutdown_signal()).await
}

/// Serves the application on `listener` until `shutdown` resolves.
///
/// Live connections are closed once shutdown begins, which ends their response
/// streams and lets in-flight requests drain.
pub async fn serve<F>(listener: TcpListener, app_state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let live_manager = app_state.live_manager.clone();

    axum::serve(listener, router::define_routes(app_state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!(
                "Shutting down, closing {} live connections",
                live_manager.connection_count()
            );
            live_manager.shutdown();
        })
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
