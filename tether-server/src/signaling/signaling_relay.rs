use crate::connection::{ConnectionRegistry, Unreachable};
use crate::identity::IdentityVerifier;
use crate::room::{MembershipTable, RoomDirectory};
use crate::signaling::RelayError;
use futures::FutureExt;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tether_core::{ClientEvent, ConnectionId, EventKind, ServerEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Result of handling one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The event was accepted and written to these connections.
    Delivered { targets: Vec<ConnectionId> },
    /// The event was refused; the sender has already been sent an `error`.
    Rejected(RelayError),
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered { .. })
    }

    pub fn targets(&self) -> &[ConnectionId] {
        match self {
            Outcome::Delivered { targets } => targets,
            Outcome::Rejected(_) => &[],
        }
    }
}

struct RelayInner {
    registry: ConnectionRegistry,
    membership: MembershipTable,
    verifier: Arc<dyn IdentityVerifier>,
    directory: Arc<dyn RoomDirectory>,
}

/// Routes signaling events between the connections that share a room.
///
/// Every event is authenticated on its own. Cloning is cheap and all clones
/// share the same connections and rooms.
#[derive(Clone)]
pub struct SignalingRelay {
    inner: Arc<RelayInner>,
}

impl SignalingRelay {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, directory: Arc<dyn RoomDirectory>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                registry: ConnectionRegistry::new(),
                membership: MembershipTable::new(),
                verifier,
                directory,
            }),
        }
    }

    /// Register a new transport session. Events for it arrive on the receiver.
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let connection_id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();

        self.inner.registry.register(connection_id, tx);
        info!("Connection {} registered", connection_id);

        (connection_id, rx)
    }

    /// Forget a connection and pull it out of every room. Nobody is notified.
    pub fn disconnect(&self, connection_id: &ConnectionId) {
        let Some(rooms) = self.inner.registry.unregister(connection_id) else {
            return;
        };

        for room_id in &rooms {
            self.inner.membership.leave(connection_id, room_id);
        }
        info!(
            "Connection {} disconnected, removed from {} room(s)",
            connection_id,
            rooms.len()
        );
    }

    /// Parse and handle one text frame.
    pub async fn handle_frame(&self, connection_id: ConnectionId, text: &str) -> Outcome {
        match ClientEvent::parse(text) {
            Ok(event) => self.handle(connection_id, event).await,
            Err(e) => self.reject(connection_id, e.into()),
        }
    }

    pub async fn handle(&self, connection_id: ConnectionId, event: ClientEvent) -> Outcome {
        let kind = event.kind;
        debug!("Handling {} from {}", kind, connection_id);

        let result = AssertUnwindSafe(self.dispatch(connection_id, event))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(RelayError::Internal(format!("{kind} handler panicked"))));

        match result {
            Ok(targets) => Outcome::Delivered { targets },
            Err(reason) => self.reject(connection_id, reason),
        }
    }

    async fn dispatch(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<Vec<ConnectionId>, RelayError> {
        match event.kind {
            EventKind::JoinRoom => self.join_room(connection_id, event).await,
            EventKind::LeaveRoom => self.leave_room(connection_id, event).await,
            EventKind::Offer | EventKind::Answer | EventKind::IceCandidate => {
                self.relay_signal(connection_id, event).await
            }
        }
    }

    async fn join_room(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<Vec<ConnectionId>, RelayError> {
        let kind = event.kind;
        let ClientEvent {
            token: Some(token),
            room_id: Some(room_id),
            ..
        } = event
        else {
            return Err(RelayError::MissingField(kind.missing_fields_message()));
        };

        let user_id = self.inner.verifier.verify(&token).await?;

        if !self.inner.directory.is_active(&room_id).await? {
            return Err(RelayError::RoomUnavailable);
        }

        let inner = &self.inner;
        inner
            .registry
            .update_rooms(&connection_id, |rooms| {
                rooms.insert(room_id.clone());
                inner.membership.join(connection_id, &room_id);
            })
            .ok_or(RelayError::Unreachable)?;

        info!("User {} joined room {}", user_id, room_id);

        let joined = ServerEvent::JoinedRoom {
            room_id: room_id.clone(),
            user_id,
        };
        Ok(self.broadcast(&room_id, joined, None))
    }

    async fn leave_room(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<Vec<ConnectionId>, RelayError> {
        let kind = event.kind;
        let ClientEvent {
            token: Some(token),
            room_id: Some(room_id),
            ..
        } = event
        else {
            return Err(RelayError::MissingField(kind.missing_fields_message()));
        };

        let user_id = self.inner.verifier.verify(&token).await?;

        let inner = &self.inner;
        let was_member = inner
            .registry
            .update_rooms(&connection_id, |rooms| {
                rooms.remove(&room_id);
                inner.membership.leave(&connection_id, &room_id)
            })
            .unwrap_or(false);

        if was_member {
            info!("User {} left room {}", user_id, room_id);
        } else {
            debug!("User {} left room {} without being a member", user_id, room_id);
        }

        let left = ServerEvent::LeftRoom {
            room_id: room_id.clone(),
            user_id,
        };
        Ok(self.broadcast(&room_id, left, None))
    }

    /// offer, answer and ice_candidate: forwarded to the room minus the sender.
    ///
    /// Neither the room's state nor the sender's membership is checked.
    async fn relay_signal(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<Vec<ConnectionId>, RelayError> {
        let kind = event.kind;
        let ClientEvent {
            token: Some(token),
            room_id: Some(room_id),
            payload: Some(payload),
            ..
        } = event
        else {
            return Err(RelayError::MissingField(kind.missing_fields_message()));
        };

        let from = self.inner.verifier.verify(&token).await?;

        let relayed = ServerEvent::relayed(kind, payload, from)
            .ok_or_else(|| RelayError::Internal(format!("{kind} carries no payload")))?;

        Ok(self.broadcast(&room_id, relayed, Some(&connection_id)))
    }

    /// Write `event` to a snapshot of the room's members.
    ///
    /// Members whose transport is gone are skipped.
    fn broadcast(
        &self,
        room_id: &str,
        event: ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Vec<ConnectionId> {
        let members = self.inner.membership.members_of(room_id);
        let mut delivered = Vec::with_capacity(members.len());

        for member in members {
            if exclude == Some(&member) {
                continue;
            }
            match self.inner.registry.send(&member, event.clone()) {
                Ok(()) => delivered.push(member),
                Err(Unreachable) => {
                    debug!("Dropping {} for unreachable connection {}", event.name(), member)
                }
            }
        }

        debug!(
            "Broadcast {} to {} member(s) of room {}",
            event.name(),
            delivered.len(),
            room_id
        );
        delivered
    }

    fn reject(&self, connection_id: ConnectionId, reason: RelayError) -> Outcome {
        match &reason {
            RelayError::Unreachable => {
                debug!("Connection {} went away mid-event", connection_id);
                return Outcome::Rejected(reason);
            }
            RelayError::Internal(detail) => {
                error!("Failed to handle event from {}: {}", connection_id, detail)
            }
            other => warn!("Rejected event from {}: {}", connection_id, other),
        }

        let notice = ServerEvent::error(reason.to_string());
        if self.inner.registry.send(&connection_id, notice).is_err() {
            debug!("Could not deliver error to {}", connection_id);
        }
        Outcome::Rejected(reason)
    }

    pub fn members_of(&self, room_id: &str) -> HashSet<ConnectionId> {
        self.inner.membership.members_of(room_id)
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> HashSet<String> {
        self.inner.registry.rooms_of(connection_id)
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.inner.registry.contains(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn room_count(&self) -> usize {
        self.inner.membership.room_count()
    }
}
