use std::collections::HashSet;

use serde_json::json;
use tether_core::{EventKind, ServerEvent};

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{TestClient, token_for};

#[tokio::test]
async fn test_two_peer_negotiation() {
    init_tracing();

    let (relay, _directory) = create_test_relay(&["r1"]);
    let mut a = TestClient::connect(&relay);
    let mut b = TestClient::connect(&relay);
    let token_a = token_for("A");
    let token_b = token_for("B");

    a.join(&token_a, "r1").await;
    b.join(&token_b, "r1").await;

    // A saw both joins, B only its own (it was not yet a member when A joined).
    let a_events = a.drain();
    let b_events = b.drain();
    assert_eq!(
        a_events,
        vec![
            ServerEvent::JoinedRoom {
                room_id: "r1".to_string(),
                user_id: "A".into(),
            },
            ServerEvent::JoinedRoom {
                room_id: "r1".to_string(),
                user_id: "B".into(),
            },
        ]
    );
    assert_eq!(
        b_events,
        vec![ServerEvent::JoinedRoom {
            room_id: "r1".to_string(),
            user_id: "B".into(),
        }]
    );

    a.signal(EventKind::Offer, &token_a, "r1", json!("sdp1")).await;
    assert_eq!(
        b.drain(),
        vec![ServerEvent::Offer {
            offer: json!("sdp1"),
            from: "A".into(),
        }]
    );
    assert!(a.drain().is_empty());

    b.leave(&token_b, "r1").await;
    assert_eq!(
        a.drain(),
        vec![ServerEvent::LeftRoom {
            room_id: "r1".to_string(),
            user_id: "B".into(),
        }]
    );
    assert!(b.drain().is_empty());
    assert_eq!(relay.members_of("r1"), HashSet::from([a.id]));
}
