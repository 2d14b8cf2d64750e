use crate::model::connection::ConnectionId;
use crate::model::subject::SubjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to turn a raw text frame into a [`ClientEvent`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Malformed event")]
    Malformed,

    #[error("Unknown event")]
    UnknownEvent(String),
}

/// Inbound event names accepted by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    JoinRoom,
    LeaveRoom,
    Offer,
    Answer,
    IceCandidate,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::JoinRoom => "join_room",
            EventKind::LeaveRoom => "leave_room",
            EventKind::Offer => "offer",
            EventKind::Answer => "answer",
            EventKind::IceCandidate => "ice_candidate",
        }
    }

    /// Name of the opaque signaling field carried by relay events.
    pub fn payload_field(self) -> Option<&'static str> {
        match self {
            EventKind::JoinRoom | EventKind::LeaveRoom => None,
            EventKind::Offer => Some("offer"),
            EventKind::Answer => Some("answer"),
            EventKind::IceCandidate => Some("candidate"),
        }
    }

    /// Client-visible message for an event whose required fields are absent.
    pub fn missing_fields_message(self) -> String {
        match self.payload_field() {
            None => "Token and room_id are required".to_string(),
            Some(field) => format!("Token, room_id, and {field} are required"),
        }
    }
}

impl FromStr for EventKind {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join_room" => Ok(EventKind::JoinRoom),
            "leave_room" => Ok(EventKind::LeaveRoom),
            "offer" => Ok(EventKind::Offer),
            "answer" => Ok(EventKind::Answer),
            "ice_candidate" => Ok(EventKind::IceCandidate),
            other => Err(FrameError::UnknownEvent(other.to_string())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// An inbound event with every field optional.
///
/// Fields that are absent, of the wrong type, or falsy are `None`; the relay
/// decides which of them are required for each [`EventKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEvent {
    pub kind: EventKind,
    pub token: Option<String>,
    pub room_id: Option<String>,
    pub payload: Option<Value>,
}

impl ClientEvent {
    /// Parse a `{"event": "...", "data": {...}}` text frame.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let frame: RawFrame = serde_json::from_str(text).map_err(|_| FrameError::Malformed)?;
        let kind = frame.event.parse::<EventKind>()?;
        Ok(Self::from_data(kind, &frame.data))
    }

    pub fn from_data(kind: EventKind, data: &Value) -> Self {
        let payload = kind
            .payload_field()
            .and_then(|field| data.get(field))
            .filter(|value| is_present(value))
            .cloned();

        Self {
            kind,
            token: text_field(data, "token"),
            room_id: text_field(data, "room_id"),
            payload,
        }
    }

    pub fn join_room(token: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            kind: EventKind::JoinRoom,
            token: Some(token.into()),
            room_id: Some(room_id.into()),
            payload: None,
        }
    }

    pub fn leave_room(token: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            kind: EventKind::LeaveRoom,
            token: Some(token.into()),
            room_id: Some(room_id.into()),
            payload: None,
        }
    }

    pub fn signal(
        kind: EventKind,
        token: impl Into<String>,
        room_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            kind,
            token: Some(token.into()),
            room_id: Some(room_id.into()),
            payload: Some(payload).filter(is_present),
        }
    }
}

fn text_field(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Whether a JSON value counts as "provided" for a required field.
///
/// `null`, `false`, zero and empty strings, arrays or objects do not.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Events written by the relay to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        sid: ConnectionId,
    },
    JoinedRoom {
        room_id: String,
        user_id: SubjectId,
    },
    LeftRoom {
        room_id: String,
        user_id: SubjectId,
    },
    Offer {
        offer: Value,
        from: SubjectId,
    },
    Answer {
        answer: Value,
        from: SubjectId,
    },
    IceCandidate {
        candidate: Value,
        from: SubjectId,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    /// Relay event of the given kind carrying `payload` from `from`.
    ///
    /// Returns `None` for kinds that carry no signaling payload.
    pub fn relayed(kind: EventKind, payload: Value, from: SubjectId) -> Option<Self> {
        match kind {
            EventKind::Offer => Some(ServerEvent::Offer {
                offer: payload,
                from,
            }),
            EventKind::Answer => Some(ServerEvent::Answer {
                answer: payload,
                from,
            }),
            EventKind::IceCandidate => Some(ServerEvent::IceCandidate {
                candidate: payload,
                from,
            }),
            EventKind::JoinRoom | EventKind::LeaveRoom => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::JoinedRoom { .. } => "joined_room",
            ServerEvent::LeftRoom { .. } => "left_room",
            ServerEvent::Offer { .. } => "offer",
            ServerEvent::Answer { .. } => "answer",
            ServerEvent::IceCandidate { .. } => "ice_candidate",
            ServerEvent::Error { .. } => "error",
        }
    }
}
