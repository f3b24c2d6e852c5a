//! Focuswatch: attention scoring engine for webcam monitoring
//!
//! Per frame: detector evidence → FrameClassifier → EngagementTracker → EmittedFrame

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{MonitorError, Result};

// =============================================================================
// FRAME SCORES - fixed per-branch values
// =============================================================================

/// Score when no frontal face and no profile is visible
pub const SCORE_NO_FACE: f64 = 0.0;

/// Score when only a profile face is visible
pub const SCORE_PROFILE: f64 = 10.0;

/// Score override when the face sits in the top band of the frame
pub const SCORE_ABOVE_CAMERA: f64 = 10.0;

/// Score override when the head is tilted up
pub const SCORE_HEAD_TILTED_UP: f64 = 25.0;

/// Score override when the eyes sit high in the face box
pub const SCORE_LOOKING_UP: f64 = 15.0;

/// Score cap when the face is in a frame corner
pub const SCORE_DIAGONAL_CAP: f64 = 20.0;

/// Base score for a visible frontal face
pub const SCORE_FRONTAL_BASE: f64 = 60.0;

pub const BONUS_TWO_EYES: f64 = 30.0;
pub const BONUS_EYES_CENTERED: f64 = 15.0;
pub const PENALTY_LOOKING_DOWN: f64 = 15.0;
pub const BONUS_ONE_EYE: f64 = 15.0;
pub const BONUS_NO_EYES: f64 = 10.0;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

// =============================================================================
// GEOMETRY THRESHOLDS
// =============================================================================

/// Face top edge above this fraction of frame height = looking above camera
pub const TOP_BAND_RATIO: f64 = 0.15;

/// Face center this many pixels above frame center = head tilted up
pub const HEAD_TILT_OFFSET_PX: i64 = 80;

/// Eye line above this fraction of face height = looking up
pub const EYE_RATIO_UP: f64 = 0.25;

/// Eye line at or below this fraction of face height = looking down
pub const EYE_RATIO_DOWN: f64 = 0.55;

/// Face center offset (fraction of frame size, both axes) = diagonal viewing
pub const DIAGONAL_OFFSET_RATIO: f64 = 0.3;

/// Face area ratio above which the size bonus applies
pub const FACE_RATIO_NEAR: f64 = 0.02;

/// Face area ratio below which the subject is too far
pub const FACE_RATIO_FAR: f64 = 0.01;

/// Size bonus = min(cap, ratio × multiplier)
pub const SIZE_BONUS_MULTIPLIER: f64 = 300.0;
pub const SIZE_BONUS_CAP: f64 = 15.0;
pub const PENALTY_TOO_FAR: f64 = 15.0;

// =============================================================================
// TRACKER
// =============================================================================

/// Weight of the current frame in the exponential moving average
pub const SMOOTHING_ALPHA: f64 = 0.7;

/// Smoothed score at session start
pub const INITIAL_FOCUS_SCORE: f64 = 100.0;

/// Continuous away time before `away_5_seconds` fires
pub const AWAY_THRESHOLD_SECS: f64 = 5.0;

/// Default cooldown between transition alerts of the same kind (standalone monitor)
pub const DEFAULT_ALERT_COOLDOWN_SECS: f64 = 3.0;

// =============================================================================
// SCORE GRADES
// =============================================================================

pub const GRADE_EXCELLENT: f64 = 85.0;
pub const GRADE_GOOD: f64 = 70.0;
pub const GRADE_DISTRACTED: f64 = 50.0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
