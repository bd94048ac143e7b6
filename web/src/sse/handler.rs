use crate::extractors::authenticated_user::AuthenticatedUserId;
use axum::extract::State;
use axum::http::HeaderName;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::IntoResponse;
use events::{ConnectedData, Event, EventPayload};
use log::*;
use realtime::{SseTransport, Transport, TransportKind};
use service::AppState;

/// Opens a long-lived event stream for the authenticated user.
///
/// The first frame is `sse_connected` carrying the connection id. After that
/// every live event published for the user is written as it is dequeued.
pub(crate) async fn sse_handler(
    AuthenticatedUserId(user_id): AuthenticatedUserId,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    debug!("Establishing SSE connection for user {user_id}");

    let (connection, registration) = app_state.live_manager.open(user_id, TransportKind::Sse);
    let (mut transport, receiver) = SseTransport::channel();

    let connected = Event::for_user(
        EventPayload::SseConnected(ConnectedData {
            connection_id: connection.id().to_string(),
        }),
        user_id,
    );
    // The channel has a free slot, so this frame is the first the client reads.
    if let Err(e) = transport.send(&connected).await {
        warn!("Could not queue sse_connected for {}: {e}", connection.id());
    }

    tokio::spawn(connection.run(transport, registration));

    (
        [(HeaderName::from_static("x-accel-buffering"), "no")],
        Sse::new(SseTransport::into_stream(receiver)).keep_alive(KeepAlive::default()),
    )
}
