//! Relay publishing against in-process WebSocket relays
//!
//! Run with: cargo test --test integration_publish

mod common;

use common::{refused_relay, signed_event, spawn_relay, Behaviour};
use serde_json::Value;
use shout_core::{publish_to_relay, publish_to_relays, PublishConfig, PublishError};
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_single_relay_accepts_and_receives_one_frame() {
    let relay = spawn_relay(Behaviour::Accept).await;
    let event = signed_event("one frame only");

    let ack = publish_to_relay(&relay.url, &event, &PublishConfig::default())
        .await
        .unwrap();

    assert_eq!(ack.detail, Value::Bool(true));
    assert_eq!(relay.frames.await.unwrap(), 1);
}

#[tokio::test]
async fn test_second_ack_is_ignored() {
    let relay = spawn_relay(Behaviour::AcceptTwice).await;
    let event = signed_event("ack twice");

    let report = publish_to_relays(&[relay.url.clone()], &event, &PublishConfig::default()).await;

    assert_eq!(report.len(), 1);
    let ack = report.outcomes[0].result.as_ref().unwrap();
    assert_eq!(ack.detail, Value::Bool(true));
    assert_eq!(ack.message.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_close_without_reply_is_no_response() {
    let relay = spawn_relay(Behaviour::CloseWithoutReply).await;
    let event = signed_event("nobody home");

    let result = publish_to_relay(&relay.url, &event, &PublishConfig::default()).await;

    assert_eq!(result, Err(PublishError::NoResponse { relay: relay.url }));
}

#[tokio::test]
async fn test_fan_out_preserves_order_and_collects_failures() {
    let refused = refused_relay().await;
    let accepting = spawn_relay(Behaviour::Accept).await;
    let wrong_id = spawn_relay(Behaviour::WrongId).await;
    let noisy = spawn_relay(Behaviour::NoiseThenAccept).await;
    let rejecting = spawn_relay(Behaviour::Reject("blocked: no spam")).await;

    let relays = vec![
        refused.clone(),
        accepting.url.clone(),
        wrong_id.url.clone(),
        noisy.url.clone(),
        rejecting.url.clone(),
    ];
    let event = signed_event("fan out");

    let report = publish_to_relays(&relays, &event, &PublishConfig::default()).await;

    assert_eq!(report.len(), relays.len());
    for (outcome, relay) in report.outcomes.iter().zip(&relays) {
        assert_eq!(&outcome.relay, relay);
    }

    assert!(matches!(
        report.outcomes[0].result,
        Err(PublishError::Connection { .. })
    ));
    assert!(report.outcomes[1].is_fulfilled());
    assert!(matches!(
        report.outcomes[2].result,
        Err(PublishError::NoResponse { .. })
    ));
    assert!(report.outcomes[3].is_fulfilled());

    // A relay that answers `false` still acknowledged the event
    let rejected_ack = report.outcomes[4].result.as_ref().unwrap();
    assert!(!rejected_ack.accepted());
    assert_eq!(rejected_ack.message.as_deref(), Some("blocked: no spam"));

    let summary = report.summary();
    assert_eq!(summary.fulfilled, 3);
    assert_eq!(summary.rejected, 2);
}

#[tokio::test]
async fn test_slow_relay_does_not_lose_fast_result() {
    let slow = spawn_relay(Behaviour::SlowAccept(Duration::from_millis(300))).await;
    let fast = spawn_relay(Behaviour::Accept).await;
    let event = signed_event("different speeds");

    let report = publish_to_relays(
        &[slow.url.clone(), fast.url.clone()],
        &event,
        &PublishConfig::default(),
    )
    .await;

    assert_eq!(report.outcomes[0].relay, slow.url);
    assert_eq!(report.outcomes[1].relay, fast.url);
    assert!(report.outcomes.iter().all(|o| o.is_fulfilled()));
}

#[tokio::test]
async fn test_relays_are_published_concurrently() {
    let delay = Duration::from_millis(400);
    let mut relays = Vec::new();
    for _ in 0..3 {
        relays.push(spawn_relay(Behaviour::SlowAccept(delay)).await);
    }
    let urls: Vec<String> = relays.iter().map(|r| r.url.clone()).collect();
    let event = signed_event("all at once");

    let started = Instant::now();
    let report = publish_to_relays(&urls, &event, &PublishConfig::unbounded()).await;
    let elapsed = started.elapsed();

    assert_eq!(report.summary().fulfilled, 3);
    // One after another would take at least the sum of the delays
    assert!(
        elapsed < delay * 3,
        "publishing to 3 slow relays took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_client_closes_after_matching_ack() {
    let relay = spawn_relay(Behaviour::AcceptThenHold).await;
    let event = signed_event("hang up first");

    let config = PublishConfig::unbounded();
    let publishing = publish_to_relay(&relay.url, &event, &config);
    let ack = tokio::time::timeout(Duration::from_secs(5), publishing)
        .await
        .expect("publish did not return after the ack")
        .unwrap();
    assert!(ack.accepted());

    let client_closed = tokio::time::timeout(Duration::from_secs(5), relay.client_closed)
        .await
        .expect("relay never saw the connection end")
        .unwrap();
    assert!(client_closed);
}

#[tokio::test]
async fn test_silent_relay_times_out_without_blocking_others() {
    let silent = spawn_relay(Behaviour::Silent).await;
    let accepting = spawn_relay(Behaviour::Accept).await;
    let event = signed_event("deadline");
    let config = PublishConfig::with_timeout(Duration::from_millis(300));

    let report = publish_to_relays(&[silent.url.clone(), accepting.url.clone()], &event, &config).await;

    assert_eq!(
        report.outcomes[0].result,
        Err(PublishError::Timeout {
            relay: silent.url.clone(),
            after: Duration::from_millis(300),
        })
    );
    assert!(report.outcomes[1].is_fulfilled());
}

#[tokio::test]
async fn test_duplicate_relays_are_published_independently() {
    let first = spawn_relay(Behaviour::Accept).await;
    let refused = refused_relay().await;
    let event = signed_event("duplicates");

    let relays = vec![refused.clone(), first.url.clone(), refused.clone()];
    let report = publish_to_relays(&relays, &event, &PublishConfig::default()).await;

    assert_eq!(report.len(), 3);
    assert!(report.outcomes[0].is_rejected());
    assert!(report.outcomes[1].is_fulfilled());
    assert!(report.outcomes[2].is_rejected());
}
