mod connection;
mod event;
mod subject;

pub use connection::ConnectionId;
pub use event::{ClientEvent, EventKind, FrameError, ServerEvent, is_present};
pub use subject::SubjectId;
