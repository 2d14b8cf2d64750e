use serde_json::json;
use tether_core::{EventKind, ServerEvent};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{TestClient, token_for};

#[tokio::test]
async fn test_sender_need_not_be_a_member() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&["r1"]);
    let mut alice = TestClient::connect(&relay);
    let mut outsider = TestClient::connect(&relay);

    alice.join(&token_for("alice"), "r1").await;
    alice.drain();

    let outcome = outsider
        .signal(EventKind::Offer, &token_for("outsider"), "r1", json!("early"))
        .await;

    assert_eq!(outcome.targets(), &[alice.id]);
    assert_eq!(
        alice.drain(),
        vec![ServerEvent::Offer {
            offer: json!("early"),
            from: "outsider".into(),
        }]
    );
    assert!(outsider.drain().is_empty());
    assert!(!relay.members_of("r1").contains(&outsider.id));
}

#[tokio::test]
async fn test_relay_continues_after_room_deactivation() {
    init_tracing();

    let (relay, directory) = create_test_relay(&["r1"]);
    let mut alice = TestClient::connect(&relay);
    let mut bob = TestClient::connect(&relay);

    alice.join(&token_for("alice"), "r1").await;
    bob.join(&token_for("bob"), "r1").await;
    alice.drain();
    bob.drain();

    directory.deactivate("r1");

    bob.signal(EventKind::Answer, &token_for("bob"), "r1", json!("late"))
        .await;
    assert_eq!(alice.drain().len(), 1);

    // New joins are refused once the room is inactive.
    let mut carol = TestClient::connect(&relay);
    assert!(!carol.join(&token_for("carol"), "r1").await.is_delivered());
    assert_eq!(
        carol.drain(),
        vec![ServerEvent::error("Room not found or inactive")]
    );
}

#[tokio::test]
async fn test_relay_to_unknown_room_is_accepted_and_empty() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&[]);
    let mut alice = TestClient::connect(&relay);

    let outcome = alice
        .signal(
            EventKind::IceCandidate,
            &token_for("alice"),
            "nowhere",
            json!("candidate"),
        )
        .await;

    assert!(outcome.is_delivered());
    assert!(outcome.targets().is_empty());
    assert!(alice.drain().is_empty());
}
