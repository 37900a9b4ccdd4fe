//! Countly ingestion request encoding.
//!
//! Every request is a form-encoded `POST` to [`INGEST_PATH`] carrying the
//! common parameters (`app_key`, `device_id`, `timestamp`, `sdk_name`,
//! `sdk_version`) followed by the parameters of its [`RequestKind`]:
//!
//! | kind | parameters |
//! |---|---|
//! | begin session | `begin_session=1`, `metrics=<json>` |
//! | session update | `session_duration=<secs>` |
//! | end session | `end_session=1`, `session_duration=<secs>` |
//! | events | `events=<json array>` |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::types::{AppKey, DeviceId};

/// Path of the ingestion endpoint, relative to the host.
pub const INGEST_PATH: &str = "/i";

/// Reported as `sdk_name` on every request.
pub const SDK_NAME: &str = "metricskit-rust";

/// Reported as `sdk_version` on every request.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Device metrics sent when a session begins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(rename = "_os")]
    pub os: String,
    #[serde(rename = "_os_version", default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(rename = "_device", default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(rename = "_app_version", default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

impl Metrics {
    /// Metrics describing the current platform.
    pub fn detect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            os_version: None,
            device: Some(std::env::consts::ARCH.to_string()),
            app_version: None,
        }
    }

    /// Sets the reported application version.
    #[must_use]
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }
}

/// What a request reports.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    /// Start of a session, with device metrics.
    BeginSession(Metrics),
    /// Seconds elapsed since the previous duration report.
    SessionUpdate { duration_secs: u64 },
    /// End of a session, with the final unreported duration.
    EndSession { duration_secs: u64 },
    /// A batch of queued events.
    Events(Vec<Event>),
}

impl RequestKind {
    /// Short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeginSession(_) => "begin_session",
            Self::SessionUpdate { .. } => "session_update",
            Self::EndSession { .. } => "end_session",
            Self::Events(_) => "events",
        }
    }
}

/// A single ingestion request, ready to be encoded.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub app_key: &'a AppKey,
    pub device_id: &'a DeviceId,
    pub timestamp: DateTime<Utc>,
    pub kind: RequestKind,
}

impl Request<'_> {
    /// Encodes the request as ordered form parameters.
    pub fn form_params(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut params = vec![
            ("app_key", self.app_key.to_string()),
            ("device_id", self.device_id.to_string()),
            ("timestamp", self.timestamp.timestamp().to_string()),
            ("sdk_name", SDK_NAME.to_string()),
            ("sdk_version", SDK_VERSION.to_string()),
        ];

        match &self.kind {
            RequestKind::BeginSession(metrics) => {
                params.push(("begin_session", "1".to_string()));
                params.push(("metrics", serde_json::to_string(metrics)?));
            }
            RequestKind::SessionUpdate { duration_secs } => {
                params.push(("session_duration", duration_secs.to_string()));
            }
            RequestKind::EndSession { duration_secs } => {
                params.push(("end_session", "1".to_string()));
                params.push(("session_duration", duration_secs.to_string()));
            }
            RequestKind::Events(events) => {
                params.push(("events", serde_json::to_string(events)?));
            }
        }

        Ok(params)
    }
}
