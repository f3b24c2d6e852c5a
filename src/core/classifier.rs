//! Frame Classifier: one frame of detector evidence → score, state, alerts
//!
//! Rules, first match wins:
//! 1. No frontal face, profile visible → 10, AWAY (right before left)
//! 2. No frontal face, no profile      → 0, AWAY
//! 3. Frontal face, base 60:
//!    a. top edge in top 15% of frame  → 10, AWAY (stops here)
//!    b. center > 80px above middle    → 25, AWAY (stops here)
//!    c. eye rule, then diagonal cap, then distance adjustment
//!    d. clamp to [0, 100]
//!
//! Pure function of the evidence; no history.

use crate::{
    BONUS_EYES_CENTERED, BONUS_NO_EYES, BONUS_ONE_EYE, BONUS_TWO_EYES,
    DIAGONAL_OFFSET_RATIO, EYE_RATIO_DOWN, EYE_RATIO_UP, FACE_RATIO_FAR, FACE_RATIO_NEAR,
    HEAD_TILT_OFFSET_PX, PENALTY_LOOKING_DOWN, PENALTY_TOO_FAR, SCORE_ABOVE_CAMERA,
    SCORE_DIAGONAL_CAP, SCORE_FRONTAL_BASE, SCORE_HEAD_TILTED_UP, SCORE_LOOKING_UP, SCORE_MAX,
    SCORE_MIN, SCORE_NO_FACE, SCORE_PROFILE, SIZE_BONUS_CAP, SIZE_BONUS_MULTIPLIER,
    TOP_BAND_RATIO,
};
use crate::types::{Alert, AttentionState, BBox, DetectionEvidence, FrameResult, StatusLabel};

/// Stateless frame classifier
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClassifier;

impl FrameClassifier {
    /// Create new classifier
    pub fn new() -> Self {
        Self
    }

    /// Classify one frame. Total: every evidence combination yields a result.
    pub fn classify(&self, evidence: &DetectionEvidence) -> FrameResult {
        match (evidence.frontal_face, evidence.profile_right, evidence.profile_left) {
            (Some(face), _, _) => classify_frontal(face, evidence),
            (None, Some(_), _) => profile_result(StatusLabel::ProfileRight, Alert::LookingRight),
            (None, None, Some(_)) => profile_result(StatusLabel::ProfileLeft, Alert::LookingLeft),
            (None, None, None) => {
                let mut result =
                    FrameResult::new(SCORE_NO_FACE, StatusLabel::NoFace, AttentionState::Away);
                result.alerts.push(Alert::NoFace);
                result
            }
        }
    }
}

fn profile_result(label: StatusLabel, alert: Alert) -> FrameResult {
    let mut result = FrameResult::new(SCORE_PROFILE, label, AttentionState::Away);
    result.alerts.push(alert);
    result
}

fn classify_frontal(face: BBox, evidence: &DetectionEvidence) -> FrameResult {
    let mut result = head_pose_override(face, evidence).unwrap_or_else(|| {
        let mut result = eye_rule(face, &evidence.eyes);
        result.eyes_detected = evidence.eyes.len();
        apply_diagonal_cap(&mut result, face, evidence);
        apply_distance(&mut result, face, evidence);
        result
    });

    result.raw_score = result.raw_score.clamp(SCORE_MIN, SCORE_MAX);
    result.faces_detected = 1;
    result
}

/// Rules 3a/3b: face too high in frame. Short-circuits everything else.
fn head_pose_override(face: BBox, evidence: &DetectionEvidence) -> Option<FrameResult> {
    let top_band = evidence.frame_height as f64 * TOP_BAND_RATIO;
    let (score, label, alert) = if (face.y as f64) < top_band {
        (SCORE_ABOVE_CAMERA, StatusLabel::AboveCamera, Alert::AboveCameraCopying)
    } else if (face.center_y() as i64) < (evidence.frame_height / 2) as i64 - HEAD_TILT_OFFSET_PX {
        (SCORE_HEAD_TILTED_UP, StatusLabel::HeadTiltedUp, Alert::HeadTiltedUp)
    } else {
        return None;
    };

    let mut result = FrameResult::new(score, label, AttentionState::Away);
    result.alerts.push(alert);
    Some(result)
}

/// Rule 3c: score from the eyes found inside the face box
fn eye_rule(face: BBox, eyes: &[BBox]) -> FrameResult {
    let base = SCORE_FRONTAL_BASE;
    match eyes.len() {
        0 => FrameResult::new(base + BONUS_NO_EYES, StatusLabel::NoEyes, AttentionState::Unknown),
        1 => FrameResult::new(base + BONUS_ONE_EYE, StatusLabel::OneEye, AttentionState::Focused),
        _ => {
            let pair = &eyes[..2];
            let avg_eye_y = pair.iter().map(|e| e.center_y() as f64).sum::<f64>() / pair.len() as f64;
            let ratio = avg_eye_y / face.height as f64;
            let score = base + BONUS_TWO_EYES;

            if ratio < EYE_RATIO_UP {
                let mut result =
                    FrameResult::new(SCORE_LOOKING_UP, StatusLabel::LookingUp, AttentionState::Away);
                result.alerts.push(Alert::LookingUpCopying);
                result
            } else if ratio < EYE_RATIO_DOWN {
                FrameResult::new(score + BONUS_EYES_CENTERED, StatusLabel::Focused, AttentionState::Focused)
            } else {
                let mut result = FrameResult::new(
                    score - PENALTY_LOOKING_DOWN,
                    StatusLabel::LookingDown,
                    AttentionState::LookingDown,
                );
                result.alerts.push(Alert::LookingDown);
                result
            }
        }
    }
}

/// Face pushed into a frame corner: cap the score, keep earlier alerts
fn apply_diagonal_cap(result: &mut FrameResult, face: BBox, evidence: &DetectionEvidence) {
    let dx = (face.center_x() as i64 - (evidence.frame_width / 2) as i64).abs() as f64;
    let dy = (face.center_y() as i64 - (evidence.frame_height / 2) as i64).abs() as f64;

    if dx > evidence.frame_width as f64 * DIAGONAL_OFFSET_RATIO
        && dy > evidence.frame_height as f64 * DIAGONAL_OFFSET_RATIO
    {
        result.raw_score = result.raw_score.min(SCORE_DIAGONAL_CAP);
        result.label = StatusLabel::Diagonal;
        result.candidate_state = AttentionState::Away;
        result.alerts.push(Alert::DiagonalViewing);
    }
}

/// Near faces earn a bonus, far faces a penalty
fn apply_distance(result: &mut FrameResult, face: BBox, evidence: &DetectionEvidence) {
    let frame_area = evidence.frame_width as f64 * evidence.frame_height as f64;
    let face_ratio = face.area() as f64 / frame_area;

    if face_ratio > FACE_RATIO_NEAR {
        result.raw_score += SIZE_BONUS_CAP.min(face_ratio * SIZE_BONUS_MULTIPLIER);
    } else if face_ratio < FACE_RATIO_FAR {
        result.raw_score -= PENALTY_TOO_FAR;
        result.too_far = true;
    }
}

// =============================================================================
// TESTS
// =============================================================================
