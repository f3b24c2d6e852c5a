//! Per-frame tracker output

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use crate::types::{Alert, AlertKind, AttentionState};
use crate::{GRADE_DISTRACTED, GRADE_EXCELLENT, GRADE_GOOD};

/// Output record emitted by the tracker once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedFrame {
    /// Wall-clock time of emission
    pub timestamp: DateTime<Utc>,
    /// Exponentially smoothed focus score
    pub smoothed_score: f64,
    /// This frame's classifier score
    pub raw_score: f64,
    pub status: String,
    pub state: AttentionState,
    /// Seconds continuously away, 0.0 when not away
    pub away_duration: f64,
    /// Frame alerts plus `away_5_seconds`
    pub alerts: Vec<Alert>,
    /// State-transition alert that passed the cooldown gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_alert: Option<AlertKind>,
    pub faces_detected: usize,
    pub eyes_detected: usize,
}

impl EmittedFrame {
    pub fn grade(&self) -> ScoreGrade {
        ScoreGrade::from_score(self.smoothed_score)
    }

    pub fn alert_tags(&self) -> Vec<&'static str> {
        self.alerts.iter().map(|a| a.tag()).collect()
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let state_color = self.state.color_code();
        let reset = AttentionState::color_reset();
        let score = self.grade().paint(&format!("{:5.1}", self.smoothed_score));

        let mut line = format!(
            "{}{}{} focus={} | raw={:5.1} | state={}{}{} | {}",
            state_color,
            self.state.emoji(),
            reset,
            score,
            self.raw_score,
            state_color,
            self.state,
            reset,
            self.status,
        );
        if self.away_duration > 0.0 {
            let timer = format!("away={:.1}s", self.away_duration);
            let timer = if self.alerts.contains(&Alert::AwayFiveSeconds) {
                timer.red().bold()
            } else {
                timer.yellow()
            };
            line.push_str(&format!(" | {}", timer));
        }
        if !self.alerts.is_empty() {
            line.push_str(&format!(" | alerts={}", self.alert_tags().join(",").dimmed()));
        }
        line
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "focus={:.2} | raw={:.2} | state={} | away={:.2}s | alerts={} | status={}",
            self.smoothed_score,
            self.raw_score,
            self.state.tag(),
            self.away_duration,
            self.alert_tags().join(","),
            self.status,
        )
    }
}

/// Coarse focus grade used for colouring and score distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGrade {
    /// 85 – 100
    Excellent,
    /// 70 – 85
    Good,
    /// 50 – 70
    Distracted,
    /// below 50
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= GRADE_EXCELLENT {
            Self::Excellent
        } else if score >= GRADE_GOOD {
            Self::Good
        } else if score >= GRADE_DISTRACTED {
            Self::Distracted
        } else {
            Self::Poor
        }
    }

    pub fn paint(&self, text: &str) -> ColoredString {
        match self {
            Self::Excellent => text.green().bold(),
            Self::Good => text.yellow(),
            Self::Distracted => text.truecolor(255, 165, 0),
            Self::Poor => text.red(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmittedFrame {
        EmittedFrame {
            timestamp: Utc::now(),
            smoothed_score: 72.5,
            raw_score: 10.0,
            status: "<!> LOOKING RIGHT (AWAY)".to_string(),
            state: AttentionState::Away,
            away_duration: 5.25,
            alerts: vec![Alert::LookingRight, Alert::AwayFiveSeconds],
            transition_alert: None,
            faces_detected: 0,
            eyes_detected: 0,
        }
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(ScoreGrade::from_score(85.0), ScoreGrade::Excellent);
        assert_eq!(ScoreGrade::from_score(84.99), ScoreGrade::Good);
        assert_eq!(ScoreGrade::from_score(70.0), ScoreGrade::Good);
        assert_eq!(ScoreGrade::from_score(50.0), ScoreGrade::Distracted);
        assert_eq!(ScoreGrade::from_score(49.9), ScoreGrade::Poor);
    }

    #[test]
    fn test_parseable_string() {
        let out = sample().to_parseable_string();
        assert_eq!(
            out,
            "focus=72.50 | raw=10.00 | state=away | away=5.25s | alerts=looking_right,away_5_seconds | status=<!> LOOKING RIGHT (AWAY)"
        );
    }

    #[test]
    fn test_transition_alert_omitted_when_none() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("transition_alert"));
        assert!(json.contains("\"away_5_seconds\""));
    }
}
