use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Room directory unavailable: {0}")]
    Unavailable(String),
}

/// Authoritative source of room existence, owned by an external service.
///
/// A room that never existed and one that was deactivated both report `false`.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn is_active(&self, room_id: &str) -> Result<bool, DirectoryError>;
}

/// Directory kept in process memory. Clones share the same rooms.
#[derive(Clone, Default)]
pub struct InMemoryRoomDirectory {
    rooms: Arc<DashMap<String, bool>>,
}

impl InMemoryRoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_rooms<I, S>(room_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let directory = Self::new();
        for room_id in room_ids {
            directory.insert(room_id, true);
        }
        directory
    }

    pub fn insert(&self, room_id: impl Into<String>, active: bool) {
        self.rooms.insert(room_id.into(), active);
    }

    /// Mark an existing room active again. Unknown rooms are left unknown.
    pub fn activate(&self, room_id: &str) {
        if let Some(mut active) = self.rooms.get_mut(room_id) {
            *active = true;
        }
    }

    pub fn deactivate(&self, room_id: &str) {
        if let Some(mut active) = self.rooms.get_mut(room_id) {
            *active = false;
        }
    }

    pub fn remove(&self, room_id: &str) {
        self.rooms.remove(room_id);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn is_active(&self, room_id: &str) -> Result<bool, DirectoryError> {
        Ok(self.rooms.get(room_id).is_some_and(|active| *active))
    }
}
