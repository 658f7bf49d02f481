use std::time::Duration;

use parley_client::{ConnectStatus, MediaConstraints, SessionConfig};
use parley_core::{SessionDescription, SignalMessage};

use crate::integration::{SessionOptions, create_test_session_with, init_tracing};
use crate::utils::{
    CallEvent, CallRecorder, ListenerEvent, MockMediaSource, STEP_TIMEOUT_MS, settle, wait_until,
};

#[tokio::test]
async fn test_call_waits_for_local_media() {
    init_tracing();

    let media = MockMediaSource::new().with_delay(100);
    let alice = create_test_session_with(
        "alice",
        SessionOptions {
            media: media.clone(),
            ..Default::default()
        },
    )
    .await;

    let recorder = CallRecorder::new();
    alice.handle.call("bob", recorder.callbacks()).await.unwrap();
    alice.handle.call("carol", CallRecorder::new().callbacks()).await.unwrap();

    // Nothing is built until the stream exists.
    assert_eq!(alice.connector.link_count(), 0);

    let both_offered = wait_until(STEP_TIMEOUT_MS, || async {
        alice.signaling.sent_to("bob", "offer").await.len() == 1
            && alice.signaling.sent_to("carol", "offer").await.len() == 1
    })
    .await;
    assert!(both_offered);
    assert_eq!(media.calls(), 1, "media acquired more than once");
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn test_media_failure_fails_deferred_call() {
    init_tracing();

    let alice = create_test_session_with(
        "alice",
        SessionOptions {
            media: MockMediaSource::failing(),
            ..Default::default()
        },
    )
    .await;

    let recorder = CallRecorder::new();
    alice.handle.call("bob", recorder.callbacks()).await.unwrap();

    let expected = CallEvent::Failure("MEDIA_ERR".into());
    assert!(recorder.wait_for(STEP_TIMEOUT_MS, &expected).await);
    assert_eq!(
        alice.handle.connect_status("bob").await,
        ConnectStatus::NotConnected
    );
    assert_eq!(alice.connector.link_count(), 0);
}

#[tokio::test]
async fn test_media_failure_rejects_deferred_answer() {
    init_tracing();

    let mut bob = create_test_session_with(
        "bob",
        SessionOptions {
            media: MockMediaSource::failing(),
            ..Default::default()
        },
    )
    .await;

    bob.deliver("alice", SignalMessage::Offer(SessionDescription::offer("o")))
        .await;

    bob.expect_signal("alice", "reject")
        .await
        .expect("offer was not rejected");
    assert!(
        bob.listener
            .wait_for(STEP_TIMEOUT_MS, |e| matches!(e, ListenerEvent::Error { code } if code == "MEDIA_ERR"))
            .await
    );
    assert!(bob.handle.connections().await.is_empty());
}

#[tokio::test]
async fn test_data_only_session_skips_media() {
    init_tracing();

    let media = MockMediaSource::failing();
    let mut alice = create_test_session_with(
        "alice",
        SessionOptions {
            config: SessionConfig::default().with_media(MediaConstraints::data_only()),
            media: media.clone(),
            ..Default::default()
        },
    )
    .await;

    alice
        .handle
        .call("bob", CallRecorder::new().callbacks())
        .await
        .unwrap();

    alice.expect_signal("bob", "offer").await.expect("no offer");
    assert_eq!(media.calls(), 0);

    let link = alice.connector.last_link("bob").unwrap();
    assert!(link.config.data_channel);
    assert!(link.local_stream.is_none());
}

#[tokio::test]
async fn test_remote_hangup_cancels_answer_waiting_for_media() {
    init_tracing();

    let bob = create_test_session_with(
        "bob",
        SessionOptions {
            media: MockMediaSource::new().with_delay(200),
            ..Default::default()
        },
    )
    .await;

    bob.deliver("alice", SignalMessage::Offer(SessionDescription::offer("o")))
        .await;
    assert!(
        bob.listener
            .wait_for(STEP_TIMEOUT_MS, |e| matches!(e, ListenerEvent::AcceptCheck { .. }))
            .await
    );
    settle().await;

    // Accepted, but the answer is still waiting for the camera.
    bob.deliver("alice", SignalMessage::Hangup).await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(bob.signaling.sent_to("alice", "answer").await.is_empty());
    assert_eq!(
        bob.handle.connect_status("alice").await,
        ConnectStatus::NotConnected
    );
    assert!(bob.handle.connections().await.is_empty());
    assert_eq!(bob.connector.link_count(), 0);
    assert_eq!(
        bob.listener
            .count(|e| matches!(
                e,
                ListenerEvent::CallCancelled { peer_id, explicitly: true } if peer_id.as_str() == "alice"
            ))
            .await,
        1
    );
}

#[tokio::test]
async fn test_local_hangup_cancels_call_waiting_for_media() {
    init_tracing();

    let alice = create_test_session_with(
        "alice",
        SessionOptions {
            media: MockMediaSource::new().with_delay(200),
            ..Default::default()
        },
    )
    .await;

    let recorder = CallRecorder::new();
    alice.handle.call("bob", recorder.callbacks()).await.unwrap();
    alice.handle.hangup("bob").await;

    let expected = CallEvent::Failure("SYSTEM_ERR".into());
    assert!(recorder.wait_for(STEP_TIMEOUT_MS, &expected).await);

    // Media arrives after the hangup and must not revive the call.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(alice.signaling.sent_to("bob", "offer").await.is_empty());
    assert_eq!(
        alice.handle.connect_status("bob").await,
        ConnectStatus::NotConnected
    );
    assert_eq!(alice.connector.link_count(), 0);
}
