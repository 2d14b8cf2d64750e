use dashmap::DashMap;
use std::collections::HashSet;
use tether_core::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;

struct ConnectionEntry {
    outbound: mpsc::UnboundedSender<ServerEvent>,
    rooms: HashSet<String>,
}

/// The recipient's transport is gone; the event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unreachable;

/// Live connections, the queue that routes to each of them and the rooms
/// each one has joined.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        connection_id: ConnectionId,
        outbound: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.connections.insert(
            connection_id,
            ConnectionEntry {
                outbound,
                rooms: HashSet::new(),
            },
        );
    }

    /// Drops the connection and returns the rooms it had joined.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<HashSet<String>> {
        self.connections
            .remove(connection_id)
            .map(|(_, entry)| entry.rooms)
    }

    /// Runs `f` on the connection's joined-room set while its entry is locked.
    ///
    /// Returns `None` if the connection is no longer registered. Callers may
    /// touch the membership table inside `f`; the registry entry is always
    /// locked before any membership shard.
    pub fn update_rooms<R>(
        &self,
        connection_id: &ConnectionId,
        f: impl FnOnce(&mut HashSet<String>) -> R,
    ) -> Option<R> {
        self.connections
            .get_mut(connection_id)
            .map(|mut entry| f(&mut entry.rooms))
    }

    pub fn send(&self, connection_id: &ConnectionId, event: ServerEvent) -> Result<(), Unreachable> {
        let entry = self.connections.get(connection_id).ok_or(Unreachable)?;
        entry.outbound.send(event).map_err(|_| Unreachable)
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> HashSet<String> {
        self.connections
            .get(connection_id)
            .map(|entry| entry.rooms.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
