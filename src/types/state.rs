//! Attention state definitions

use serde::{Deserialize, Serialize};

/// The four engagement states a monitored subject can be in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionState {
    /// Frontal face, eyes on screen
    #[default]
    Focused,
    /// Frontal face, eyes low in the face box
    LookingDown,
    /// Not looking at the screen (no face, profile, overrides)
    Away,
    /// Frontal face but not enough eye evidence to decide
    Unknown,
}

impl AttentionState {
    /// All states, in reporting order
    pub const ALL: [AttentionState; 4] = [
        AttentionState::Focused,
        AttentionState::LookingDown,
        AttentionState::Away,
        AttentionState::Unknown,
    ];

    /// Wire tag, as used in the `state` egress field
    pub fn tag(&self) -> &'static str {
        match self {
            AttentionState::Focused => "focused",
            AttentionState::LookingDown => "looking_down",
            AttentionState::Away => "away",
            AttentionState::Unknown => "unknown",
        }
    }

    /// Counts as distracted time in session statistics
    pub fn is_distracted(&self) -> bool {
        matches!(self, AttentionState::Away | AttentionState::LookingDown)
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            AttentionState::Focused => "\x1b[32m",     // Green
            AttentionState::LookingDown => "\x1b[33m", // Yellow
            AttentionState::Away => "\x1b[31m",        // Red
            AttentionState::Unknown => "\x1b[90m",     // Gray
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            AttentionState::Focused => "🎯",
            AttentionState::LookingDown => "⬇",
            AttentionState::Away => "🚫",
            AttentionState::Unknown => "❔",
        }
    }
}

impl std::fmt::Display for AttentionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttentionState::Focused => "FOCUSED",
            AttentionState::LookingDown => "LOOKING_DOWN",
            AttentionState::Away => "AWAY",
            AttentionState::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_match_serde() {
        for state in AttentionState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.tag()));
        }
    }

    #[test]
    fn test_default_is_focused() {
        assert_eq!(AttentionState::default(), AttentionState::Focused);
    }
}
