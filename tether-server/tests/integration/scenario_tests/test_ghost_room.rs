use tether_core::ServerEvent;
use tether_server::{Outcome, RelayError};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{TestClient, token_for};

#[tokio::test]
async fn test_ghost_room() {
    init_tracing();

    let (relay, directory) = create_test_relay(&["r1"]);
    directory.insert("ghost", false);

    let mut alice = TestClient::connect(&relay);
    alice.join(&token_for("alice"), "r1").await;
    alice.drain();

    let mut c = TestClient::connect(&relay);
    let outcome = c.join(&token_for("C"), "ghost").await;

    assert_eq!(outcome, Outcome::Rejected(RelayError::RoomUnavailable));
    assert_eq!(
        c.drain(),
        vec![ServerEvent::error("Room not found or inactive")]
    );
    assert!(alice.drain().is_empty());
    assert!(relay.members_of("ghost").is_empty());
    assert_eq!(relay.room_count(), 1);
    assert!(relay.rooms_of(&c.id).is_empty());
}

#[tokio::test]
async fn test_nonexistent_room_reads_like_inactive() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&[]);
    let mut c = TestClient::connect(&relay);

    c.join(&token_for("C"), "never-created").await;

    assert_eq!(
        c.drain(),
        vec![ServerEvent::error("Room not found or inactive")]
    );
    assert_eq!(relay.room_count(), 0);
}
