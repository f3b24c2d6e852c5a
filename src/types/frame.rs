//! Per-frame classification result

use serde::{Deserialize, Serialize};
use crate::types::{Alert, AttentionState};

/// Which classification branch fired
///
/// Informational only; scoring never reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    ProfileRight,
    ProfileLeft,
    NoFace,
    AboveCamera,
    HeadTiltedUp,
    LookingUp,
    Focused,
    LookingDown,
    OneEye,
    NoEyes,
    Diagonal,
}

impl StatusLabel {
    /// Display text
    pub fn text(&self) -> &'static str {
        match self {
            Self::ProfileRight => "<!> LOOKING RIGHT (AWAY)",
            Self::ProfileLeft => "<!> LOOKING LEFT (AWAY)",
            Self::NoFace => "NO FACE DETECTED",
            Self::AboveCamera => "<!> LOOKING ABOVE CAMERA - COPYING?",
            Self::HeadTiltedUp => "<!> HEAD TILTED UP (SUSPICIOUS)",
            Self::LookingUp => "<!> LOOKING UP - COPYING?",
            Self::Focused => ">> FOCUSED ON SCREEN",
            Self::LookingDown => "Looking Down",
            Self::OneEye => "Side Angle - One Eye",
            Self::NoEyes => "Eyes Not Detected",
            Self::Diagonal => "<!> LOOKING DIAGONAL (AWAY)",
        }
    }

    /// Gaze-direction labels are never suffixed with the distance note
    pub fn is_gaze_warning(&self) -> bool {
        matches!(
            self,
            Self::ProfileRight | Self::ProfileLeft | Self::AboveCamera | Self::LookingUp | Self::Diagonal
        )
    }
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Output of the frame classifier. No history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Clamped to [0, 100]
    pub raw_score: f64,
    pub label: StatusLabel,
    /// Face covers less than 1% of the frame
    pub too_far: bool,
    pub candidate_state: AttentionState,
    /// Frame-level alerts, in the order their rules fired
    pub alerts: Vec<Alert>,
    pub faces_detected: usize,
    pub eyes_detected: usize,
}

impl FrameResult {
    pub fn new(raw_score: f64, label: StatusLabel, candidate_state: AttentionState) -> Self {
        Self {
            raw_score,
            label,
            too_far: false,
            candidate_state,
            alerts: Vec::new(),
            faces_detected: 0,
            eyes_detected: 0,
        }
    }

    /// Human-readable status line
    pub fn status_text(&self) -> String {
        if self.too_far && !self.label.is_gaze_warning() {
            format!("{} (Too Far)", self.label.text())
        } else {
            self.label.text().to_string()
        }
    }

    pub fn has_alert(&self, alert: Alert) -> bool {
        self.alerts.contains(&alert)
    }
}
