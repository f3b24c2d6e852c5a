//! Integration tests for the classification engine
//!
//! Classifier + tracker together, driven with explicit instants

use std::time::{Duration, Instant};

use focuswatch::core::{EngagementTracker, FrameClassifier, MonitorSession, PreparedFrame, TrackerConfig};
use focuswatch::types::{Alert, AlertKind, AttentionState, BBox, DetectionEvidence, Detections, FrameResult};
use pretty_assertions::assert_eq;

const W: u32 = 640;
const H: u32 = 480;

fn centered_face() -> BBox {
    BBox::new(224, 176, 192, 128)
}

fn centered_eyes() -> Vec<BBox> {
    vec![BBox::new(40, 40, 30, 24), BBox::new(120, 40, 30, 24)]
}

fn classify(ev: &DetectionEvidence) -> FrameResult {
    FrameClassifier::new().classify(ev)
}

#[test]
fn test_scenario_a_focused_subject() {
    let ev = DetectionEvidence::new(W, H)
        .with_face(centered_face())
        .with_eyes(centered_eyes());
    let result = classify(&ev);

    // 60 + 30 + 15 + min(15, 0.08 * 300), clamped
    assert_eq!(result.raw_score, 100.0);
    assert_eq!(result.candidate_state, AttentionState::Focused);
    assert!(result.alerts.is_empty());
    assert_eq!(result.status_text(), ">> FOCUSED ON SCREEN");
}

#[test]
fn test_scenario_b_above_camera_ignores_eyes() {
    let face = BBox::new(224, 48, 192, 128);
    for eyes in [vec![], centered_eyes()] {
        let ev = DetectionEvidence::new(W, H).with_face(face).with_eyes(eyes);
        let result = classify(&ev);
        assert_eq!(result.raw_score, 10.0);
        assert_eq!(result.candidate_state, AttentionState::Away);
        assert_eq!(result.alerts, vec![Alert::AboveCameraCopying]);
    }
}

#[test]
fn test_scenario_c_profile_right() {
    let ev = DetectionEvidence::new(W, H).with_profile_right(BBox::new(300, 200, 100, 120));
    let result = classify(&ev);
    assert_eq!(result.raw_score, 10.0);
    assert_eq!(result.candidate_state, AttentionState::Away);
    assert_eq!(result.alerts, vec![Alert::LookingRight]);
}

#[test]
fn test_scenario_d_smoothing_decay() {
    let mut tracker = EngagementTracker::new();
    let no_face = classify(&DetectionEvidence::new(W, H));
    let t0 = Instant::now();

    for n in 1..=20 {
        let out = tracker.update(&no_face, t0 + Duration::from_millis(100 * n as u64));
        let expected = 100.0 * 0.3f64.powi(n);
        assert!(
            (out.smoothed_score - expected).abs() < 1e-9,
            "frame {}: {} != {}",
            n,
            out.smoothed_score,
            expected
        );
    }
    assert!(tracker.smoothed_score() < 1e-8);
}

#[test]
fn test_away_timer_fires_and_resets() {
    let mut tracker = EngagementTracker::new();
    let away = classify(&DetectionEvidence::new(W, H));
    let back = classify(&DetectionEvidence::new(W, H).with_face(centered_face()).with_eyes(centered_eyes()));
    let t0 = Instant::now();

    let out = tracker.update(&away, t0);
    assert_eq!(out.away_duration, 0.0);

    let out = tracker.update(&away, t0 + Duration::from_millis(4_900));
    assert!(!out.alerts.contains(&Alert::AwayFiveSeconds));

    let out = tracker.update(&away, t0 + Duration::from_secs(5));
    assert_eq!(out.away_duration, 5.0);
    assert!(out.alerts.contains(&Alert::AwayFiveSeconds));

    let out = tracker.update(&back, t0 + Duration::from_millis(5_100));
    assert_eq!(out.away_duration, 0.0);
    assert!(out.alerts.is_empty());

    // A fresh episode starts from zero
    let out = tracker.update(&away, t0 + Duration::from_secs(6));
    assert_eq!(out.away_duration, 0.0);
}

#[test]
fn test_transition_alerts_respect_cooldown() {
    let config = TrackerConfig {
        alert_cooldown: Some(Duration::from_secs(3)),
        ..TrackerConfig::default()
    };
    let mut tracker = EngagementTracker::with_config(config);
    let away = classify(&DetectionEvidence::new(W, H));
    let focused = classify(&DetectionEvidence::new(W, H).with_face(centered_face()).with_eyes(centered_eyes()));
    let t0 = Instant::now();

    assert_eq!(tracker.update(&away, t0).transition_alert, Some(AlertKind::Away));
    tracker.update(&focused, t0 + Duration::from_secs(1));
    // Within the cooldown: suppressed
    assert_eq!(tracker.update(&away, t0 + Duration::from_secs(2)).transition_alert, None);
    tracker.update(&focused, t0 + Duration::from_secs(3));
    // Suppressed attempts do not restart the cooldown
    assert_eq!(
        tracker.update(&away, t0 + Duration::from_millis(3_500)).transition_alert,
        Some(AlertKind::Away)
    );
}

#[test]
fn test_sessions_are_independent() {
    let mut a = MonitorSession::new("a", TrackerConfig::default());
    let mut b = MonitorSession::new("b", TrackerConfig::default());
    let t0 = Instant::now();

    let empty = PreparedFrame::from_detections(&Detections::default(), W, H).unwrap();
    for i in 0..10 {
        a.process(&empty, t0 + Duration::from_secs(i));
    }

    assert_eq!(a.tracker().state(), AttentionState::Away);
    assert_eq!(a.tracker().away_duration(), 9.0);
    assert_eq!(b.tracker().update_count(), 0);
    assert_eq!(b.tracker().smoothed_score(), 100.0);

    let face = Detections {
        faces: vec![centered_face()],
        eyes: centered_eyes(),
        ..Default::default()
    };
    let out = b.process(&PreparedFrame::from_detections(&face, W, H).unwrap(), t0);
    assert_eq!(out.state, AttentionState::Focused);
    assert_eq!(a.tracker().update_count(), 10);
}

#[test]
fn test_session_stats_track_time_in_state() {
    let mut session = MonitorSession::new("stats", TrackerConfig::default());
    let t0 = Instant::now();
    let focused = PreparedFrame::from_detections(
        &Detections {
            faces: vec![centered_face()],
            eyes: centered_eyes(),
            ..Default::default()
        },
        W,
        H,
    )
    .unwrap();
    let away = PreparedFrame::from_detections(&Detections::default(), W, H).unwrap();

    session.process(&focused, t0);
    session.process(&focused, t0 + Duration::from_secs(2));
    session.process(&away, t0 + Duration::from_secs(4));
    session.process(&away, t0 + Duration::from_secs(5));

    let stats = session.stats();
    assert_eq!(stats.frame_count, 4);
    assert_eq!(stats.max_score, Some(100.0));
    assert_eq!(stats.min_score, Some(0.0));
    assert!(stats.time_in_state.focused >= 4.0 - 1e-9);
    assert_eq!(stats.away_episodes, 1);
}
