mod config;
mod connection;
mod identity;
mod room;
mod signaling;

pub use config::*;
pub use connection::*;
pub use identity::*;
pub use room::*;
pub use signaling::*;
