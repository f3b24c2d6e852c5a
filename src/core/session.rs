//! One monitored subject: classifier + tracker + statistics
//!
//! Every transport goes through `MonitorSession::process`, so scoring is
//! defined in exactly one place. A session is owned by one caller at a time and
//! never shared with another session.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{EngagementTracker, FrameClassifier, PreparedFrame, StatsCollector, TrackerConfig};
use crate::types::{AttentionState, EmittedFrame, SessionStats};

#[derive(Debug)]
pub struct MonitorSession {
    id: String,
    created_at: DateTime<Utc>,
    classifier: FrameClassifier,
    tracker: EngagementTracker,
    stats: StatsCollector,
}

/// Point-in-time copy of a session, safe to hand to readers
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub focus_score: f64,
    pub state: AttentionState,
    pub status: String,
    pub away_timer: f64,
    pub frames_processed: u64,
}

impl MonitorSession {
    pub fn new(id: impl Into<String>, config: TrackerConfig) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            classifier: FrameClassifier::new(),
            tracker: EngagementTracker::with_config(config),
            stats: StatsCollector::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Classify one frame and fold it into the session
    pub fn process(&mut self, frame: &PreparedFrame, now: Instant) -> EmittedFrame {
        let mut result = self.classifier.classify(&frame.evidence);
        result.faces_detected = frame.faces_detected;

        let emitted = self.tracker.update(&result, now);
        self.stats.record(&emitted, now);
        emitted
    }

    pub fn tracker(&self) -> &EngagementTracker {
        &self.tracker
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            created_at: self.created_at,
            focus_score: round2(self.tracker.smoothed_score()),
            state: self.tracker.state(),
            status: self.tracker.current_output().status,
            away_timer: round2(self.tracker.away_duration()),
            frames_processed: self.tracker.update_count(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }
}

/// Round to two decimals for the wire
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
