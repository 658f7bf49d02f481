use parley_client::ConnectStatus;
use parley_core::{SessionDescription, SignalMessage};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{CallRecorder, ListenerEvent, STEP_TIMEOUT_MS};

#[tokio::test]
async fn test_transport_close_drops_calls_without_signaling() {
    init_tracing();

    let mut alice = create_test_session("alice").await;
    alice
        .handle
        .call("bob", CallRecorder::new().callbacks())
        .await
        .unwrap();
    alice.expect_signal("bob", "offer").await.expect("no offer");
    alice
        .deliver("bob", SignalMessage::Answer(SessionDescription::answer("a")))
        .await;
    assert!(alice.wait_for_status("bob", ConnectStatus::Connected).await);

    alice.handle.transport_closed().await;

    assert_eq!(
        alice.handle.connect_status("bob").await,
        ConnectStatus::NotConnected
    );
    assert_eq!(alice.signaling.count("hangup").await, 0);
    assert_eq!(alice.handle.self_id().await, None);
    assert_eq!(alice.listener.stream_closed_count("bob").await, 1);
    assert!(
        alice
            .listener
            .wait_for(STEP_TIMEOUT_MS, |e| matches!(e, ListenerEvent::Disconnect))
            .await
    );
    assert!(alice.connector.last_link("bob").unwrap().is_closed());
}

#[tokio::test]
async fn test_closed_inbound_channel_stops_session() {
    init_tracing();

    let alice = create_test_session("alice").await;
    let handle = alice.handle.clone();
    let listener = alice.listener.clone();
    drop(alice);

    assert!(
        listener
            .wait_for(STEP_TIMEOUT_MS, |e| matches!(e, ListenerEvent::Disconnect))
            .await
    );
    assert_eq!(handle.self_id().await, None);
}
