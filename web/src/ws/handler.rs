use crate::extractors::{
    allowed_origin::AllowedOrigin, authenticated_user::AuthenticatedUserId,
};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use log::*;
use realtime::{TransportKind, WebSocketTransport};
use service::AppState;

/// Upgrades to a WebSocket that streams the authenticated user's live events
/// as JSON envelopes. Inbound messages are ignored.
pub(crate) async fn ws_handler(
    AllowedOrigin(origin): AllowedOrigin,
    AuthenticatedUserId(user_id): AuthenticatedUserId,
    State(app_state): State<AppState>,
    upgrade: WebSocketUpgrade,
) -> Response {
    debug!("Upgrading WebSocket for user {user_id} from {origin}");

    upgrade.on_upgrade(move |socket| async move {
        let (connection, registration) = app_state
            .live_manager
            .open(user_id, TransportKind::WebSocket);
        connection
            .run(WebSocketTransport::new(socket), registration)
            .await;
    })
}
