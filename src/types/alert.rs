//! Alert tags

use serde::{Deserialize, Serialize};

/// Alert tags carried in the `alerts` egress list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    // =========================================================================
    // Frame-level (FrameClassifier)
    // =========================================================================
    /// Nothing detected at all
    NoFace,
    /// Only a right profile visible
    LookingRight,
    /// Only a left profile visible
    LookingLeft,
    /// Face in the top band of the frame
    AboveCameraCopying,
    /// Face center well above frame center
    HeadTiltedUp,
    /// Eyes in the upper quarter of the face box
    LookingUpCopying,
    /// Eyes in the lower part of the face box
    LookingDown,
    /// Face pushed into a frame corner
    DiagonalViewing,

    // =========================================================================
    // Session-level (EngagementTracker)
    // =========================================================================
    /// Continuously away for at least the away threshold
    #[serde(rename = "away_5_seconds")]
    AwayFiveSeconds,
}

impl Alert {
    /// Wire tag
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NoFace => "no_face",
            Self::LookingRight => "looking_right",
            Self::LookingLeft => "looking_left",
            Self::AboveCameraCopying => "above_camera_copying",
            Self::HeadTiltedUp => "head_tilted_up",
            Self::LookingUpCopying => "looking_up_copying",
            Self::LookingDown => "looking_down",
            Self::DiagonalViewing => "diagonal_viewing",
            Self::AwayFiveSeconds => "away_5_seconds",
        }
    }

    /// Points the subject in a direction rather than out of frame
    pub fn is_directional(&self) -> bool {
        matches!(self, Self::LookingRight | Self::LookingLeft | Self::DiagonalViewing)
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Kinds of state-transition alert subject to cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Entered `away` with no face or an override
    Away,
    /// Entered `looking_down`
    LookingDown,
    /// Entered `away` by looking sideways or into a corner
    LookingAway,
}

impl AlertKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Away => "away",
            Self::LookingDown => "looking_down",
            Self::LookingAway => "looking_away",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
