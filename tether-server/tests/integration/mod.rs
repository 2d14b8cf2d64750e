pub mod relay_tests;

use std::sync::Arc;

use tracing::Level;

use tether_server::{InMemoryRoomDirectory, JwtVerifier, SignalingRelay};

use crate::utils::TEST_SECRET;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A relay whose directory holds `active_rooms` as active rooms.
pub fn create_test_relay(active_rooms: &[&str]) -> (SignalingRelay, InMemoryRoomDirectory) {
    let directory = InMemoryRoomDirectory::with_active_rooms(active_rooms.iter().copied());
    let relay = SignalingRelay::new(
        Arc::new(JwtVerifier::new(TEST_SECRET, 0)),
        Arc::new(directory.clone()),
    );
    (relay, directory)
}
