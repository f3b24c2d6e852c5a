//! Frame ingress: payload decoding and the detector seam
//!
//! Frames arrive base64-encoded (optionally as a data URL). They are decoded and
//! converted to grayscale here; anything empty or corrupt is rejected as
//! `InvalidFrame` and never reaches the classifier.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DetectorError, MonitorError, Result};
use crate::types::{DetectionEvidence, Detections};

/// Geometric face/eye/profile detector
///
/// Implementations return frame-space boxes for faces and profiles (left
/// profiles mirrored back, see `BBox::mirror_horizontal`) and eye boxes relative
/// to the first face.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, frame: &GrayImage) -> std::result::Result<Detections, DetectorError>;
}

/// Placeholder when no detector is wired in; clients must send detections
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableDetector;

impl FaceDetector for UnavailableDetector {
    fn detect(&self, _frame: &GrayImage) -> std::result::Result<Detections, DetectorError> {
        Err(DetectorError::Unavailable)
    }
}

/// Inbound frame message, shared by every transport
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FramePayload {
    /// Base64 image, raw or `data:image/...;base64,` URL
    pub frame: Option<String>,
    /// Detections computed by the client; skips the server-side detector
    #[serde(default)]
    pub detections: Option<Detections>,
}

/// Evidence ready for classification
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFrame {
    pub evidence: DetectionEvidence,
    /// Number of frontal faces the detector reported
    pub faces_detected: usize,
}

impl PreparedFrame {
    pub fn from_detections(detections: &Detections, frame_width: u32, frame_height: u32) -> Result<Self> {
        let evidence = DetectionEvidence::from_detections(detections, frame_width, frame_height);
        evidence.validate()?;
        Ok(Self {
            evidence,
            faces_detected: detections.faces.len(),
        })
    }
}

/// Everything after the last comma, so data URLs and bare base64 both work
pub fn strip_data_url(payload: &str) -> &str {
    payload.rsplit(',').next().unwrap_or(payload).trim()
}

/// Decode a base64 image into grayscale
pub fn decode_frame(payload: &str, max_bytes: usize) -> Result<GrayImage> {
    let encoded = strip_data_url(payload);
    if encoded.is_empty() {
        return Err(MonitorError::InvalidFrame("empty frame".into()));
    }
    // base64 expands 3 bytes into 4 chars
    if encoded.len() / 4 * 3 > max_bytes {
        return Err(MonitorError::InvalidFrame(format!(
            "frame exceeds {} bytes",
            max_bytes
        )));
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| MonitorError::InvalidFrame(format!("bad base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(MonitorError::InvalidFrame("empty frame".into()));
    }

    let image = image::load_from_memory(&bytes)
        .map_err(|e| MonitorError::InvalidFrame(format!("undecodable image: {}", e)))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(MonitorError::InvalidFrame("zero-size image".into()));
    }

    Ok(image.to_luma8())
}

/// Turn an inbound payload into classifier evidence
///
/// Client detections win; otherwise the configured detector runs on the frame.
pub fn prepare_frame(
    payload: &FramePayload,
    detector: &dyn FaceDetector,
    max_bytes: usize,
) -> Result<PreparedFrame> {
    let frame = payload
        .frame
        .as_deref()
        .ok_or_else(|| MonitorError::InvalidInput("No frame data provided".into()))?;
    let gray = decode_frame(frame, max_bytes)?;
    let (width, height) = gray.dimensions();

    let detections = match &payload.detections {
        Some(d) => d.clone(),
        None => detector.detect(&gray)?,
    };
    debug!(
        width,
        height,
        faces = detections.faces.len(),
        eyes = detections.eyes.len(),
        "frame prepared"
    );

    PreparedFrame::from_detections(&detections, width, height)
}
