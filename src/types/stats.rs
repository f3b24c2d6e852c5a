//! Session statistics report

use serde::{Deserialize, Serialize};
use crate::types::AttentionState;

/// Seconds spent in each attention state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDurations {
    pub focused: f64,
    pub looking_down: f64,
    pub away: f64,
    pub unknown: f64,
}

impl StateDurations {
    pub fn get(&self, state: AttentionState) -> f64 {
        match state {
            AttentionState::Focused => self.focused,
            AttentionState::LookingDown => self.looking_down,
            AttentionState::Away => self.away,
            AttentionState::Unknown => self.unknown,
        }
    }

    pub fn add(&mut self, state: AttentionState, secs: f64) {
        match state {
            AttentionState::Focused => self.focused += secs,
            AttentionState::LookingDown => self.looking_down += secs,
            AttentionState::Away => self.away += secs,
            AttentionState::Unknown => self.unknown += secs,
        }
    }

    pub fn total(&self) -> f64 {
        self.focused + self.looking_down + self.away + self.unknown
    }
}

/// Frame counts per score grade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub excellent: u64,
    pub good: u64,
    pub distracted: u64,
    pub poor: u64,
}

impl ScoreDistribution {
    pub fn total(&self) -> u64 {
        self.excellent + self.good + self.distracted + self.poor
    }
}

/// Aggregate over the frames of one session
///
/// Derived data only: can always be rebuilt by replaying emitted frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frame_count: u64,
    /// Seconds between first and last frame
    pub duration_secs: f64,
    pub time_in_state: StateDurations,
    pub focused_secs: f64,
    pub distracted_secs: f64,
    pub current_score: f64,
    /// Raw per-frame score aggregates; `None` before the first frame
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub avg_score: Option<f64>,
    pub distribution: ScoreDistribution,
    /// Number of separate away periods
    pub away_episodes: u64,
    /// Frames carrying `away_5_seconds`
    pub away_warnings: u64,
    /// Transition alerts that passed the cooldown gate
    pub transition_alerts: u64,
}

impl SessionStats {
    pub fn focus_percentage(&self) -> f64 {
        percentage(self.focused_secs, self.duration_secs)
    }

    pub fn distracted_percentage(&self) -> f64 {
        percentage(self.distracted_secs, self.duration_secs)
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
