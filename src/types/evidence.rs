//! Detector output and the per-frame evidence the classifier consumes

use serde::{Deserialize, Serialize};
use crate::types::BBox;
use crate::error::{MonitorError, Result};

/// Raw detector output for one frame
///
/// Lists are in detector order; the first entry of each is authoritative.
/// `eyes` are relative to the first face's sub-region, `profiles_left` are
/// already mirrored back into frame space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detections {
    pub faces: Vec<BBox>,
    pub eyes: Vec<BBox>,
    pub profiles_right: Vec<BBox>,
    pub profiles_left: Vec<BBox>,
}

impl Detections {
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.profiles_right.is_empty() && self.profiles_left.is_empty()
    }
}

/// Geometric evidence for a single frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvidence {
    pub frontal_face: Option<BBox>,
    /// Relative to `frontal_face`; empty when there is no frontal face
    pub eyes: Vec<BBox>,
    pub profile_right: Option<BBox>,
    pub profile_left: Option<BBox>,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl DetectionEvidence {
    /// Empty evidence (nothing detected) for a frame of the given size
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frontal_face: None,
            eyes: Vec::new(),
            profile_right: None,
            profile_left: None,
            frame_width,
            frame_height,
        }
    }

    pub fn with_face(mut self, face: BBox) -> Self {
        self.frontal_face = Some(face);
        self
    }

    pub fn with_eyes(mut self, eyes: Vec<BBox>) -> Self {
        self.eyes = eyes;
        self
    }

    pub fn with_profile_right(mut self, profile: BBox) -> Self {
        self.profile_right = Some(profile);
        self
    }

    pub fn with_profile_left(mut self, profile: BBox) -> Self {
        self.profile_left = Some(profile);
        self
    }

    /// Pick the authoritative boxes out of a detector result
    pub fn from_detections(detections: &Detections, frame_width: u32, frame_height: u32) -> Self {
        let frontal_face = detections.faces.first().copied();
        let eyes = if frontal_face.is_some() {
            detections.eyes.clone()
        } else {
            Vec::new()
        };

        Self {
            frontal_face,
            eyes,
            profile_right: detections.profiles_right.first().copied(),
            profile_left: detections.profiles_left.first().copied(),
            frame_width,
            frame_height,
        }
    }

    /// Boundary check for evidence that did not come from a trusted detector
    ///
    /// The classifier itself never re-validates; malformed evidence is rejected
    /// here as `InvalidInput` before it can reach it.
    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(MonitorError::InvalidFrame(format!(
                "zero-size frame {}x{}",
                self.frame_width, self.frame_height
            )));
        }

        let (w, h) = (self.frame_width, self.frame_height);
        let framed = [
            ("face", self.frontal_face),
            ("right profile", self.profile_right),
            ("left profile", self.profile_left),
        ];
        for (what, bbox) in framed {
            if let Some(b) = bbox {
                if !b.fits_within(w, h) {
                    return Err(MonitorError::InvalidInput(format!(
                        "{} box {:?} outside {}x{} frame",
                        what, <[u32; 4]>::from(b), w, h
                    )));
                }
            }
        }

        if let Some(face) = self.frontal_face {
            for eye in &self.eyes {
                if !eye.fits_within(face.width, face.height) {
                    return Err(MonitorError::InvalidInput(format!(
                        "eye box {:?} outside {}x{} face region",
                        <[u32; 4]>::from(*eye), face.width, face.height
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_face_is_authoritative() {
        let detections = Detections {
            faces: vec![BBox::new(200, 150, 200, 200), BBox::new(0, 0, 50, 50)],
            eyes: vec![BBox::new(40, 60, 30, 30)],
            ..Default::default()
        };
        let ev = DetectionEvidence::from_detections(&detections, 640, 480);
        assert_eq!(ev.frontal_face, Some(BBox::new(200, 150, 200, 200)));
        assert_eq!(ev.eyes.len(), 1);
    }

    #[test]
    fn test_eyes_dropped_without_face() {
        let detections = Detections {
            eyes: vec![BBox::new(40, 60, 30, 30)],
            profiles_left: vec![BBox::new(10, 10, 100, 100)],
            ..Default::default()
        };
        let ev = DetectionEvidence::from_detections(&detections, 640, 480);
        assert!(ev.frontal_face.is_none());
        assert!(ev.eyes.is_empty());
        assert_eq!(ev.profile_left, Some(BBox::new(10, 10, 100, 100)));
    }

    #[test]
    fn test_validate_rejects_out_of_frame_face() {
        let ev = DetectionEvidence::new(640, 480).with_face(BBox::new(600, 100, 100, 100));
        assert!(matches!(ev.validate(), Err(MonitorError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_eye_outside_face() {
        let ev = DetectionEvidence::new(640, 480)
            .with_face(BBox::new(200, 150, 100, 100))
            .with_eyes(vec![BBox::new(90, 10, 20, 20)]);
        assert!(matches!(ev.validate(), Err(MonitorError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_zero_frame() {
        let ev = DetectionEvidence::new(0, 480);
        assert!(matches!(ev.validate(), Err(MonitorError::InvalidFrame(_))));
    }

    #[test]
    fn test_detections_deserialize_with_missing_lists() {
        let d: Detections = serde_json::from_str(r#"{"faces": [[1, 2, 3, 4]]}"#).unwrap();
        assert_eq!(d.faces, vec![BBox::new(1, 2, 3, 4)]);
        assert!(d.eyes.is_empty());
        assert!(!d.is_empty());
    }
}
