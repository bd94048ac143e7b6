use crate::live_connection::LiveConnection;
use dashmap::DashMap;
use events::{Event, EventHandler, Id};
use log::*;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection registry with dual indices for O(1) lookups
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup - O(1)
    connections: DashMap<ConnectionId, Arc<LiveConnection>>,

    /// Secondary index: fast lookup by user_id for event routing - O(1)
    user_index: DashMap<Id, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_index: DashMap::new(),
        }
    }

    /// Register a connection under its owner. The connection stays registered
    /// until the returned guard is dropped or `unregister` is called.
    pub fn register(self: &Arc<Self>, connection: Arc<LiveConnection>) -> Registration {
        let connection_id = connection.id().clone();
        let user_id = connection.user_id();

        // Insert into primary storage
        self.connections.insert(connection_id.clone(), connection);

        // Update secondary index
        self.user_index
            .entry(user_id)
            .or_default()
            .insert(connection_id.clone());

        Registration {
            registry: Arc::clone(self),
            connection_id,
        }
    }

    /// Unregister a connection - O(1). Returns it if it was still registered.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<Arc<LiveConnection>> {
        // Remove from primary storage
        let (_, connection) = self.connections.remove(connection_id)?;
        let user_id = connection.user_id();

        // Update secondary index
        if let Some(mut ids) = self.user_index.get_mut(&user_id) {
            ids.remove(connection_id);
        }

        // Clean up empty user entries without racing a concurrent register
        self.user_index.remove_if(&user_id, |_, ids| ids.is_empty());

        Some(connection)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Snapshot of the user's open connections.
    pub fn connections_for(&self, user_id: &Id) -> Vec<Arc<LiveConnection>> {
        let connection_ids: Vec<ConnectionId> = match self.user_index.get(user_id) {
            Some(ids) => ids.iter().cloned().collect(),
            None => return Vec::new(),
        };

        connection_ids
            .iter()
            .filter_map(|id| self.connections.get(id).map(|c| Arc::clone(c.value())))
            .collect()
    }

    /// Route `event` to its target user's connections. Events without a
    /// target are not streamed.
    pub async fn dispatch(&self, event: &Event) {
        match event.user_id() {
            Some(user_id) => self.send_to_user(user_id, event).await,
            None => trace!("{} event has no target user, not streamed", event.event_type()),
        }
    }

    /// Hand `event` to every connection of `user_id` - O(1) lookup + O(k)
    /// enqueue where k = user's connections.
    pub async fn send_to_user(&self, user_id: Id, event: &Event) {
        let connections = self.connections_for(&user_id);
        if connections.is_empty() {
            trace!(
                "No live connections for user {user_id}, {} event not streamed",
                event.event_type()
            );
            return;
        }

        for connection in connections {
            if let Err(e) = connection.handle_event(event).await {
                warn!(
                    "Failed to queue {} event on connection {}: {e}",
                    event.event_type(),
                    connection.id()
                );
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of users with at least one open connection.
    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }

    /// Close every registered connection. Each delivery loop then exits and
    /// removes its own entry.
    pub fn close_all(&self) {
        let connections: Vec<Arc<LiveConnection>> = self
            .connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        info!("Closing {} live connection(s)", connections.len());
        for connection in connections {
            connection.close();
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a connection registered for as long as it is alive. Dropping it
/// unregisters the connection and closes its queue; doing so more than once
/// (or after an explicit `unregister`) is harmless.
pub struct Registration {
    registry: Arc<ConnectionRegistry>,
    connection_id: ConnectionId,
}

impl Registration {
    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(connection) = self.registry.unregister(&self.connection_id) {
            connection.close();
            debug!(
                "Unregistered {} connection {} for user {}",
                connection.kind(),
                self.connection_id,
                connection.user_id()
            );
        }
    }
}
