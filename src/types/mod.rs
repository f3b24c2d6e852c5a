//! Core types for Focuswatch

mod state;
mod geometry;
mod evidence;
mod alert;
mod frame;
mod output;
mod stats;

pub use state::AttentionState;
pub use geometry::BBox;
pub use evidence::{Detections, DetectionEvidence};
pub use alert::{Alert, AlertKind};
pub use frame::{FrameResult, StatusLabel};
pub use output::{EmittedFrame, ScoreGrade};
pub use stats::{SessionStats, StateDurations, ScoreDistribution};
