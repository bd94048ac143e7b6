//! Real-time fan-out of published events to connected clients.
//!
//! This crate streams the live subset of bus events to the browser/app
//! sessions of the user each event is addressed to, over Server-Sent Events
//! or WebSocket.
//!
//! # Architecture
//!
//! - **Dual-index registry**: O(1) lookups for both connection management and
//!   user-scoped event routing via separate DashMap indices.
//! - **One queue per connection**: dispatch only enqueues into the bounded
//!   [`queue::EventQueue`] of each matching connection; a full queue follows
//!   the configured [`OverflowPolicy`].
//! - **One delivery loop per connection**: the only writer to the transport.
//!   It ends when the peer disconnects, a write fails or the server shuts
//!   down, and cleanup then happens exactly once through the
//!   [`connection::Registration`] guard.
//! - **Ephemeral events**: a user who is offline misses the event; there is
//!   no replay on reconnect.
//!
//! # Event Flow
//!
//! 1. Client opens `/events` or `/ws` with a token in the query string
//! 2. The web layer resolves the user and calls [`Manager::open`]
//! 3. The connection's delivery loop is spawned with its transport
//! 4. A business operation publishes an event targeted at that user
//! 5. [`LiveEventHandler`] looks up the user's connections and enqueues
//! 6. Each delivery loop writes the event as an SSE frame or WebSocket text frame
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry, ConnectionId and the Registration guard
//! - `live_connection`: LiveConnection and its delivery loop
//! - `queue`: bounded queue and overflow policies
//! - `transport`: SSE and WebSocket adapters
//! - `manager`: facade owning the registry and queue configuration

pub mod connection;
pub mod domain_event_handler;
pub mod error;
pub mod live_connection;
pub mod manager;
pub mod queue;
pub mod transport;

pub use connection::{ConnectionId, ConnectionRegistry, Registration};
pub use domain_event_handler::LiveEventHandler;
pub use error::{Error, RealtimeErrorKind};
pub use live_connection::LiveConnection;
pub use manager::{LiveConfig, Manager};
pub use queue::{OverflowPolicy, OverflowPolicyParseError};
pub use transport::{SseTransport, Transport, TransportKind, WebSocketTransport};
