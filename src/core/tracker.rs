//! Engagement Tracker: per-session fold over classified frames
//!
//! Each update, in order:
//! - away timer: starts on the first AWAY frame, resets on any other state
//! - smoothing: score = 0.7 × raw + 0.3 × previous
//! - commit state and status
//! - cooldown gate for state-transition alerts (when configured)
//!
//! Only the previous record and the current frame feed an update. Callers pass a
//! monotonic `Instant`, so time never runs backwards inside a session.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::types::{Alert, AlertKind, AttentionState, EmittedFrame, FrameResult};
use crate::{AWAY_THRESHOLD_SECS, INITIAL_FOCUS_SCORE, SMOOTHING_ALPHA};

/// Numeric knobs the tracker consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    /// Continuous away time before `away_5_seconds`
    pub away_threshold: Duration,
    /// Minimum gap between transition alerts of one kind; `None` disables them
    pub alert_cooldown: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            away_threshold: Duration::from_secs_f64(AWAY_THRESHOLD_SECS),
            alert_cooldown: None,
        }
    }
}

/// Everything the tracker remembers between frames
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementState {
    pub smoothed_score: f64,
    pub current_state: AttentionState,
    /// Start of the current away period
    pub away_since: Option<Instant>,
    /// Seconds, 0.0 outside an away period
    pub away_duration: f64,
    pub last_alert_time: HashMap<AlertKind, Instant>,
    pub last_status: String,
    pub last_raw_score: f64,
    pub last_alerts: Vec<Alert>,
    pub update_count: u64,
    /// Threshold warning already logged for this away period
    away_warned: bool,
}

impl Default for EngagementState {
    fn default() -> Self {
        Self {
            smoothed_score: INITIAL_FOCUS_SCORE,
            current_state: AttentionState::Focused,
            away_since: None,
            away_duration: 0.0,
            last_alert_time: HashMap::new(),
            last_status: String::new(),
            last_raw_score: INITIAL_FOCUS_SCORE,
            last_alerts: Vec::new(),
            update_count: 0,
            away_warned: false,
        }
    }
}

/// Per-session engagement tracker
#[derive(Debug, Default)]
pub struct EngagementTracker {
    config: TrackerConfig,
    state: EngagementState,
}

impl EngagementTracker {
    /// Create new tracker with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            state: EngagementState::default(),
        }
    }

    /// Fold one classified frame into the session
    pub fn update(&mut self, result: &FrameResult, now: Instant) -> EmittedFrame {
        let mut alerts = result.alerts.clone();

        // Away timer
        if result.candidate_state == AttentionState::Away {
            let since = *self.state.away_since.get_or_insert(now);
            let elapsed = now.saturating_duration_since(since);
            self.state.away_duration = elapsed.as_secs_f64();

            if elapsed >= self.config.away_threshold {
                alerts.push(Alert::AwayFiveSeconds);
                if !self.state.away_warned {
                    self.state.away_warned = true;
                    warn!(away_secs = self.state.away_duration, "subject away past threshold");
                }
            }
        } else {
            if self.state.away_since.is_some() {
                debug!(away_secs = self.state.away_duration, "subject returned");
            }
            self.state.away_since = None;
            self.state.away_duration = 0.0;
            self.state.away_warned = false;
        }

        // Smoothing
        self.state.smoothed_score =
            SMOOTHING_ALPHA * result.raw_score + (1.0 - SMOOTHING_ALPHA) * self.state.smoothed_score;

        // Commit
        let previous = self.state.current_state;
        self.state.current_state = result.candidate_state;
        self.state.last_status = result.status_text();
        self.state.last_raw_score = result.raw_score;
        self.state.update_count += 1;

        if previous != result.candidate_state {
            debug!(from = %previous, to = %result.candidate_state, "state changed");
        }

        // Cooldown gate
        let transition_alert = self
            .config
            .alert_cooldown
            .and_then(|cooldown| {
                let kind = transition_kind(previous, result)?;
                self.try_fire(kind, cooldown, now).then_some(kind)
            });
        if let Some(kind) = transition_alert {
            warn!(alert = %kind, status = %self.state.last_status, "transition alert");
        }

        self.state.last_alerts = alerts.clone();

        EmittedFrame {
            timestamp: Utc::now(),
            smoothed_score: self.state.smoothed_score,
            raw_score: result.raw_score,
            status: self.state.last_status.clone(),
            state: self.state.current_state,
            away_duration: self.state.away_duration,
            alerts,
            transition_alert,
            faces_detected: result.faces_detected,
            eyes_detected: result.eyes_detected,
        }
    }

    /// Allow `kind` through unless it fired within `cooldown`; record only when allowed
    fn try_fire(&mut self, kind: AlertKind, cooldown: Duration, now: Instant) -> bool {
        if let Some(last) = self.state.last_alert_time.get(&kind) {
            if now.saturating_duration_since(*last) < cooldown {
                debug!(alert = %kind, "alert suppressed by cooldown");
                return false;
            }
        }
        self.state.last_alert_time.insert(kind, now);
        true
    }

    /// Get current state
    pub fn state(&self) -> AttentionState {
        self.state.current_state
    }

    /// Get current smoothed score
    pub fn smoothed_score(&self) -> f64 {
        self.state.smoothed_score
    }

    /// Seconds continuously away as of the last update
    pub fn away_duration(&self) -> f64 {
        self.state.away_duration
    }

    pub fn update_count(&self) -> u64 {
        self.state.update_count
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Copy of the full record, for out-of-band readers
    pub fn snapshot(&self) -> EngagementState {
        self.state.clone()
    }

    /// Last emitted values without updating
    pub fn current_output(&self) -> EmittedFrame {
        EmittedFrame {
            timestamp: Utc::now(),
            smoothed_score: self.state.smoothed_score,
            raw_score: self.state.last_raw_score,
            status: self.state.last_status.clone(),
            state: self.state.current_state,
            away_duration: self.state.away_duration,
            alerts: self.state.last_alerts.clone(),
            transition_alert: None,
            faces_detected: 0,
            eyes_detected: 0,
        }
    }

    /// Reset tracker to initial state, keeping its configuration
    pub fn reset(&mut self) {
        info!(updates = self.state.update_count, "tracker reset");
        self.state = EngagementState::default();
    }
}

/// Transition alert implied by entering a new state, if any
fn transition_kind(previous: AttentionState, result: &FrameResult) -> Option<AlertKind> {
    if previous == result.candidate_state {
        return None;
    }
    match result.candidate_state {
        AttentionState::Away if result.alerts.iter().any(Alert::is_directional) => {
            Some(AlertKind::LookingAway)
        }
        AttentionState::Away => Some(AlertKind::Away),
        AttentionState::LookingDown => Some(AlertKind::LookingDown),
        AttentionState::Focused | AttentionState::Unknown => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================
