use serde_json::json;
use tether_core::{EventKind, ServerEvent};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{TestClient, token_for};

#[tokio::test]
async fn test_relay_isolated_per_room() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&["r1", "r2"]);
    let mut alice = TestClient::connect(&relay);
    let mut bob = TestClient::connect(&relay);
    let mut carol = TestClient::connect(&relay);
    let mut dave = TestClient::connect(&relay);

    alice.join(&token_for("alice"), "r1").await;
    bob.join(&token_for("bob"), "r1").await;
    carol.join(&token_for("carol"), "r2").await;
    dave.join(&token_for("dave"), "r2").await;
    for client in [&mut alice, &mut bob, &mut carol, &mut dave] {
        client.drain();
    }

    alice
        .signal(EventKind::Offer, &token_for("alice"), "r1", json!("sdp-r1"))
        .await;
    carol
        .signal(EventKind::Offer, &token_for("carol"), "r2", json!("sdp-r2"))
        .await;

    assert_eq!(
        bob.drain(),
        vec![ServerEvent::Offer {
            offer: json!("sdp-r1"),
            from: "alice".into(),
        }]
    );
    assert_eq!(
        dave.drain(),
        vec![ServerEvent::Offer {
            offer: json!("sdp-r2"),
            from: "carol".into(),
        }]
    );
    assert!(alice.drain().is_empty());
    assert!(carol.drain().is_empty());
}
