//! End-to-end auto-center loop behaviour over scripted vision replies

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use framepilot::detect::{CenterLoop, PHOTO_TAKEN_FEEDBACK, TickOutcome};
use framepilot::vision::VisionReply;

mod common;

use common::{FakeCamera, RecordingSpeaker, ScriptedVision};

fn center_loop(vision: ScriptedVision, target: &str) -> CenterLoop {
    CenterLoop::new(
        Arc::new(FakeCamera::new()),
        Arc::new(vision),
        Duration::from_millis(5),
        target,
    )
}

#[tokio::test]
async fn test_directional_reply_is_spoken_and_loop_continues() {
    let mut speaker = RecordingSpeaker::new();
    let mut center = center_loop(ScriptedVision::from_texts(&["COMMAND: move left"]), "a red mug");

    let outcome = center.tick(&mut speaker).await;

    assert!(matches!(outcome, TickOutcome::Continue(ref f) if f == "move left"));
    assert_eq!(speaker.transcript(), vec!["move left".to_string()]);
}

#[tokio::test]
async fn test_ready_reply_captures_photo() {
    let mut speaker = RecordingSpeaker::new();
    let mut center = center_loop(
        ScriptedVision::from_texts(&["COMMAND: ready\nBBOX: [0.3,0.3,0.7,0.7]"]),
        "a red mug",
    );

    let outcome = center.tick(&mut speaker).await;

    let TickOutcome::Captured(photo) = outcome else {
        panic!("expected captured photo");
    };
    assert_eq!((photo.width, photo.height), (8, 8));
    assert_eq!(speaker.transcript(), vec![PHOTO_TAKEN_FEEDBACK.to_string()]);
}

#[tokio::test]
async fn test_repeated_directional_replies_force_capture_on_fourth_tick() {
    let mut speaker = RecordingSpeaker::new();
    let vision = ScriptedVision::from_texts(&["COMMAND: move up"]);
    let queries = Arc::clone(&vision.queries);
    let mut center = center_loop(vision, "a red mug");

    for _ in 0..3 {
        assert!(matches!(
            center.tick(&mut speaker).await,
            TickOutcome::Continue(_)
        ));
    }
    assert!(matches!(
        center.tick(&mut speaker).await,
        TickOutcome::Captured(_)
    ));

    assert_eq!(*queries.lock().unwrap(), 4);
    let transcript = speaker.transcript();
    assert_eq!(&transcript[..3], &["move up", "move up", "move up"]);
    assert_eq!(transcript[3], PHOTO_TAKEN_FEEDBACK);
}

#[tokio::test]
async fn test_capture_failure_skips_tick_without_querying() {
    let mut speaker = RecordingSpeaker::new();
    let vision = ScriptedVision::from_texts(&["COMMAND: move left"]);
    let queries = Arc::clone(&vision.queries);
    let mut center = CenterLoop::new(
        Arc::new(FakeCamera { available: false }),
        Arc::new(vision),
        Duration::from_millis(5),
        "a red mug",
    );

    let outcome = center.tick(&mut speaker).await;

    assert!(matches!(outcome, TickOutcome::Skipped));
    assert_eq!(*queries.lock().unwrap(), 0);
    assert!(speaker.transcript().is_empty());
}

#[tokio::test]
async fn test_not_visible_with_target_in_description_becomes_off_center() {
    let mut speaker = RecordingSpeaker::new();
    let vision = ScriptedVision::new(vec![VisionReply {
        text: "not visible".to_string(),
        debug_description: Some("A desk with a red mug near the left edge.".to_string()),
    }]);
    let mut center = center_loop(vision, "red mug");

    let outcome = center.tick(&mut speaker).await;

    let TickOutcome::Continue(feedback) = outcome else {
        panic!("expected continue");
    };
    assert!(feedback.contains("not centered"), "got: {feedback}");
}

#[tokio::test]
async fn test_not_visible_without_description_stays_not_visible() {
    let mut speaker = RecordingSpeaker::new();
    let mut center = center_loop(ScriptedVision::from_texts(&["not visible"]), "red mug");

    let outcome = center.tick(&mut speaker).await;

    assert!(matches!(outcome, TickOutcome::Continue(ref f) if f == "not visible"));
}

#[tokio::test]
async fn test_shutdown_stops_loop_without_photo() {
    let mut speaker = RecordingSpeaker::new();
    let mut center = center_loop(ScriptedVision::from_texts(&["COMMAND: move left"]), "a red mug");

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    shutdown_tx.send(()).await.unwrap();

    let result = center.run(&mut speaker, &mut shutdown_rx).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_run_loops_until_ready() {
    let mut speaker = RecordingSpeaker::new();
    let mut center = center_loop(
        ScriptedVision::from_texts(&[
            "COMMAND: move left",
            "COMMAND: move closer",
            "COMMAND: ready\nBBOX: [0.4,0.4,0.6,0.6]",
        ]),
        "a red mug",
    );

    let (_shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let photo = tokio::time::timeout(
        Duration::from_secs(5),
        center.run(&mut speaker, &mut shutdown_rx),
    )
    .await
    .expect("loop should converge")
    .unwrap();

    assert!(photo.is_some());
    assert_eq!(
        speaker.transcript(),
        vec!["move left", "move closer", PHOTO_TAKEN_FEEDBACK]
    );
}
