//! Offline monitor: feeds recorded detections through a session
//!
//! Input is JSON lines, one frame each:
//! `{"t": 0.033, "frame_width": 640, "frame_height": 480, "detections": {"faces": [[224, 176, 192, 128]]}}`
//!
//! `t` is seconds since the start of the recording and must never decrease.
//! Emitted frames are stamped at replay start plus `t`. A rejected line leaves
//! the session exactly as it was.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{MonitorSession, PreparedFrame, TrackerConfig};
use crate::error::{MonitorError, Result};
use crate::types::{Detections, EmittedFrame, SessionStats};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Seconds since recording start
    pub t: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default)]
    pub detections: Detections,
}

#[derive(Debug)]
pub struct Replay {
    session: MonitorSession,
    origin: Instant,
    started_at: DateTime<Utc>,
    last_t: Option<f64>,
    line: usize,
}

impl Replay {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            session: MonitorSession::new("replay", config),
            origin: Instant::now(),
            started_at: Utc::now(),
            last_t: None,
            line: 0,
        }
    }

    /// Feed one input line; blank lines and `#` comments yield `None`
    pub fn feed_line(&mut self, text: &str) -> Result<Option<EmittedFrame>> {
        self.line += 1;
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let record: ReplayRecord = serde_json::from_str(text).map_err(|e| self.error(e.to_string()))?;
        self.feed(&record).map(Some)
    }

    /// Feed one parsed record
    pub fn feed(&mut self, record: &ReplayRecord) -> Result<EmittedFrame> {
        if !record.t.is_finite() || record.t < 0.0 {
            return Err(self.error(format!("bad timestamp {}", record.t)));
        }
        if let Some(last) = self.last_t {
            if record.t < last {
                return Err(self.error(format!("timestamp {} before previous {}", record.t, last)));
            }
        }

        let offset = Duration::try_from_secs_f64(record.t)
            .ok()
            .and_then(|offset| Some((self.origin.checked_add(offset)?, offset)));
        let Some((now, offset)) = offset else {
            return Err(self.error(format!("timestamp {} out of range", record.t)));
        };

        let prepared = PreparedFrame::from_detections(
            &record.detections,
            record.frame_width,
            record.frame_height,
        )
        .map_err(|e| self.error(e.to_string()))?;

        self.last_t = Some(record.t);
        let mut out = self.session.process(&prepared, now);
        if let Some(stamp) = TimeDelta::from_std(offset)
            .ok()
            .and_then(|delta| self.started_at.checked_add_signed(delta))
        {
            out.timestamp = stamp;
        }
        debug!(t = record.t, state = %out.state, score = out.smoothed_score, "replayed frame");
        Ok(out)
    }

    pub fn frames(&self) -> u64 {
        self.session.tracker().update_count()
    }

    pub fn stats(&self) -> SessionStats {
        self.session.stats()
    }

    fn error(&self, message: String) -> MonitorError {
        MonitorError::Replay {
            line: self.line,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alert, AttentionState};

    fn no_face(t: f64) -> String {
        format!(r#"{{"t": {}, "frame_width": 640, "frame_height": 480}}"#, t)
    }

    #[test]
    fn test_replay_drives_away_timer() {
        let mut replay = Replay::new(TrackerConfig::default());
        for t in [0.0, 1.0, 2.0, 3.0, 4.0] {
            replay.feed_line(&no_face(t)).unwrap();
        }
        let out = replay.feed_line(&no_face(5.0)).unwrap().unwrap();
        assert_eq!(out.away_duration, 5.0);
        assert!(out.alerts.contains(&Alert::AwayFiveSeconds));
        assert_eq!(replay.frames(), 6);
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let mut replay = Replay::new(TrackerConfig::default());
        assert!(replay.feed_line("").unwrap().is_none());
        assert!(replay.feed_line("# recorded 2026-10-01").unwrap().is_none());
        assert_eq!(replay.frames(), 0);
    }

    #[test]
    fn test_rejects_backwards_time_without_touching_state() {
        let mut replay = Replay::new(TrackerConfig::default());
        replay.feed_line(&no_face(2.0)).unwrap();
        let err = replay.feed_line(&no_face(1.0)).unwrap_err();
        assert!(matches!(err, MonitorError::Replay { line: 2, .. }));
        assert_eq!(replay.frames(), 1);
    }

    #[test]
    fn test_replay_rejects_out_of_range_t() {
        let mut replay = Replay::new(TrackerConfig::default());
        replay.feed_line(&no_face(0.0)).unwrap();

        let err = replay.feed_line(&no_face(1e30)).unwrap_err();
        assert!(matches!(err, MonitorError::Replay { line: 2, .. }));
        assert_eq!(replay.frames(), 1);

        // Still accepted: the bad line did not advance the clock
        let out = replay.feed_line(&no_face(1.0)).unwrap().unwrap();
        assert_eq!(out.away_duration, 1.0);
        assert_eq!(replay.frames(), 2);
    }

    #[test]
    fn test_timestamps_follow_recording() {
        let mut replay = Replay::new(TrackerConfig::default());
        let first = replay.feed_line(&no_face(0.0)).unwrap().unwrap();
        let second = replay.feed_line(&no_face(2.5)).unwrap().unwrap();
        assert_eq!((second.timestamp - first.timestamp).num_milliseconds(), 2_500);
    }

    #[test]
    fn test_rejects_invalid_evidence() {
        let mut replay = Replay::new(TrackerConfig::default());
        let line = r#"{"t": 0.0, "frame_width": 640, "frame_height": 480, "detections": {"faces": [[600, 0, 100, 100]]}}"#;
        assert!(replay.feed_line(line).is_err());
        let line = r#"{"t": 0.0, "frame_width": 0, "frame_height": 480}"#;
        assert!(replay.feed_line(line).is_err());
        assert_eq!(replay.frames(), 0);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let mut replay = Replay::new(TrackerConfig::default());
        let err = replay.feed_line("{not json").unwrap_err();
        assert!(matches!(err, MonitorError::Replay { line: 1, .. }));
    }

    #[test]
    fn test_focused_frame() {
        let mut replay = Replay::new(TrackerConfig::default());
        let line = r#"{"t": 0.0, "frame_width": 640, "frame_height": 480,
            "detections": {"faces": [[224, 176, 192, 128]], "eyes": [[40, 40, 30, 24], [120, 40, 30, 24]]}}"#;
        let out = replay.feed_line(&line.replace('\n', " ")).unwrap().unwrap();
        assert_eq!(out.state, AttentionState::Focused);
        assert_eq!(out.raw_score, 100.0);
    }
}
