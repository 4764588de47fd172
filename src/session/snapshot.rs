use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Shown in place of a pairing code when none has been issued yet
pub const PAIRING_CODE_PLACEHOLDER: &str = "----";

/// Broadcast phase derived from shared state
///
/// Presence of the session start time is the sole source of truth for
/// "is broadcasting"; there is no direct start/stop callback from the
/// recorder process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
}

impl SessionPhase {
    /// Pure derivation from the observed start-time key, decoupled from
    /// timer mechanics
    pub fn from_start_time(start: Option<DateTime<Utc>>) -> Self {
        match start {
            Some(_) => SessionPhase::Active,
            None => SessionPhase::Idle,
        }
    }
}

/// Host-visible view of the current session, safe to render from a
/// fixed-interval timer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    /// Whether a broadcast session is active
    pub active: bool,
    /// Time elapsed since the session started (zero when idle)
    pub elapsed: Duration,
    /// Current pairing code, or a placeholder when none is set
    pub pairing_code: String,
}

impl StateSnapshot {
    pub fn idle() -> Self {
        Self {
            active: false,
            elapsed: Duration::ZERO,
            pairing_code: PAIRING_CODE_PLACEHOLDER.to_string(),
        }
    }
}

/// Capture quality requested from the recorder
///
/// Written to shared state before a session starts and read by the
/// recorder once at session start. Delivery is best-effort: there is no
/// confirmation path back from the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamQuality {
    Low,
    Medium,
    High,
}

impl StreamQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamQuality::Low => "low",
            StreamQuality::Medium => "medium",
            StreamQuality::High => "high",
        }
    }
}

impl FromStr for StreamQuality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(StreamQuality::Low),
            "medium" => Ok(StreamQuality::Medium),
            "high" => Ok(StreamQuality::High),
            other => bail!("Unknown stream quality: {}", other),
        }
    }
}
