use parley_client::ConnectStatus;

use crate::integration::{init_tracing, join_relay};
use crate::utils::{CallRecorder, LoopbackRelay, STEP_TIMEOUT_MS, wait_until};

#[tokio::test]
async fn test_simultaneous_calls_converge_on_one_connection() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let alice = join_relay(&relay, "alice").await;
    let bob = join_relay(&relay, "bob").await;

    let (a, b) = tokio::join!(
        alice.handle.call("bob", CallRecorder::new().callbacks()),
        bob.handle.call("alice", CallRecorder::new().callbacks()),
    );
    a.unwrap();
    b.unwrap();

    let converged = wait_until(STEP_TIMEOUT_MS, || async {
        alice.handle.connect_status("bob").await == ConnectStatus::Connected
            && bob.handle.connect_status("alice").await == ConnectStatus::Connected
    })
    .await;
    assert!(converged);

    let alice_side = alice.handle.connections().await;
    let bob_side = bob.handle.connections().await;
    assert_eq!(alice_side.len(), 1);
    assert_eq!(bob_side.len(), 1);
    // Exactly one offer/answer exchange won.
    assert_ne!(alice_side[0].role, bob_side[0].role);
    let initiators = [&alice_side[0], &bob_side[0]]
        .iter()
        .filter(|summary| summary.is_initiator())
        .count();
    assert_eq!(initiators, 1);
}
