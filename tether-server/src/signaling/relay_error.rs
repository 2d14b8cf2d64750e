use crate::identity::AuthError;
use crate::room::DirectoryError;
use tether_core::FrameError;
use thiserror::Error;

/// Why an inbound event was not relayed.
///
/// The `Display` text is what the sender receives in its `error` event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("{0}")]
    MissingField(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Room not found or inactive")]
    RoomUnavailable,

    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The originating connection is gone; never reported to anyone.
    #[error("Connection is no longer reachable")]
    Unreachable,

    /// Detail is logged, not sent.
    #[error("Internal server error")]
    Internal(String),
}

impl From<DirectoryError> for RelayError {
    fn from(e: DirectoryError) -> Self {
        RelayError::Internal(e.to_string())
    }
}
