use std::collections::HashSet;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{TestClient, token_for};

#[tokio::test]
async fn test_disconnect_is_silent() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&["r1"]);
    let mut alice = TestClient::connect(&relay);
    let bob = TestClient::connect(&relay);

    alice.join(&token_for("alice"), "r1").await;
    bob.join(&token_for("bob"), "r1").await;
    alice.drain();

    bob.disconnect();

    assert!(alice.drain().is_empty(), "disconnect must not broadcast");
    assert_eq!(relay.members_of("r1"), HashSet::from([alice.id]));
    assert!(!relay.is_connected(&bob.id));
    assert_eq!(relay.connection_count(), 1);
}

#[tokio::test]
async fn test_disconnect_removes_from_every_room() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&["r1", "r2"]);
    let alice = TestClient::connect(&relay);
    let token = token_for("alice");

    alice.join(&token, "r1").await;
    alice.join(&token, "r2").await;
    assert_eq!(relay.room_count(), 2);

    alice.disconnect();

    assert!(relay.members_of("r1").is_empty());
    assert!(relay.members_of("r2").is_empty());
    assert_eq!(relay.room_count(), 0);

    // A second disconnect of the same connection is harmless.
    alice.disconnect();
}

#[tokio::test]
async fn test_events_after_disconnect_do_not_resurrect_membership() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&["r1"]);
    let alice = TestClient::connect(&relay);
    alice.disconnect();

    let outcome = alice.join(&token_for("alice"), "r1").await;

    assert!(!outcome.is_delivered());
    assert!(relay.members_of("r1").is_empty());
}
