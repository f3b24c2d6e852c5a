//! Core modules for Focuswatch

pub mod classifier;
pub mod tracker;
pub mod stats;
pub mod detector;
pub mod session;
pub mod replay;
pub mod api;

pub use classifier::FrameClassifier;
pub use tracker::{EngagementTracker, EngagementState, TrackerConfig};
pub use stats::{StatsCollector, format_report};
pub use detector::{FaceDetector, UnavailableDetector, FramePayload, PreparedFrame, decode_frame, prepare_frame, strip_data_url};
pub use session::{MonitorSession, SessionStatus, round2};
pub use replay::{ReplayRecord, Replay};
pub use api::{create_router, create_router_with_detector, run_server};
