//! Monitor configuration
//!
//! Loaded from an optional TOML file; CLI flags override individual values.
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:8000"
//!
//! [tracking]
//! away_threshold_secs = 5.0
//! alert_cooldown_secs = 3.0
//!
//! [logging]
//! log_level = "debug"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::TrackerConfig;
use crate::error::{MonitorError, Result};
use crate::logging::LogConfig;
use crate::{AWAY_THRESHOLD_SECS, DEFAULT_ALERT_COOLDOWN_SECS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub server: ServerConfig,
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
    pub frame: FrameConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub away_threshold_secs: f64,
    /// Cooldown for transition alerts; unset disables the gate for API sessions
    pub alert_cooldown_secs: Option<f64>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            away_threshold_secs: AWAY_THRESHOLD_SECS,
            alert_cooldown_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Upper bound on the decoded image payload
    pub max_frame_bytes: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 8 * 1024 * 1024,
        }
    }
}

impl MonitorConfig {
    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| MonitorError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from a file when one is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| MonitorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.tracking;
        to_duration("tracking.away_threshold_secs", t.away_threshold_secs)?;
        if let Some(c) = t.alert_cooldown_secs {
            to_duration("tracking.alert_cooldown_secs", c)?;
        }
        if self.frame.max_frame_bytes == 0 {
            return Err(MonitorError::Config("frame.max_frame_bytes must be > 0".into()));
        }
        Ok(())
    }

    /// Tracker settings for request/response sessions
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            away_threshold: saturating_duration(self.tracking.away_threshold_secs),
            alert_cooldown: self.tracking.alert_cooldown_secs.map(saturating_duration),
        }
    }

    /// Tracker settings for the standalone monitor, where the cooldown gate is always on
    pub fn standalone_tracker_config(&self) -> TrackerConfig {
        let cooldown = self
            .tracking
            .alert_cooldown_secs
            .unwrap_or(DEFAULT_ALERT_COOLDOWN_SECS);
        TrackerConfig {
            away_threshold: saturating_duration(self.tracking.away_threshold_secs),
            alert_cooldown: Some(saturating_duration(cooldown)),
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.logging.log_level.clone(),
            ..LogConfig::default()
        }
    }
}

/// Seconds to `Duration`, rejecting negative, non-finite and out-of-range values
pub fn to_duration(field: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        MonitorError::Config(format!("{} must be a non-negative number of seconds, got {}", field, secs))
    })
}

/// Conversion for values that skipped `validate`
fn saturating_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}
