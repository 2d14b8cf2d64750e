use dashmap::DashMap;
use std::collections::HashSet;
use tether_core::ConnectionId;

/// Room id to the connections currently joined to it.
///
/// Each room lives in its own `DashMap` entry, so mutations of one room are
/// serialized while other rooms stay readable. Empty rooms are pruned.
#[derive(Default)]
pub struct MembershipTable {
    rooms: DashMap<String, HashSet<ConnectionId>>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the connection was already a member.
    pub fn join(&self, connection_id: ConnectionId, room_id: &str) -> bool {
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(connection_id)
    }

    /// Returns `false` when the connection was not a member.
    pub fn leave(&self, connection_id: &ConnectionId, room_id: &str) -> bool {
        let removed = match self.rooms.get_mut(room_id) {
            Some(mut members) => members.remove(connection_id),
            None => return false,
        };

        self.rooms.remove_if(room_id, |_, members| members.is_empty());
        removed
    }

    /// Point-in-time copy of the member set; the room lock is released on return.
    pub fn members_of(&self, room_id: &str) -> HashSet<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.value().clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, room_id: &str, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
