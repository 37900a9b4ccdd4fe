//! Logged analytics events.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EventKey, ValidationError};

/// Key/value tags used to categorize an event.
///
/// Ordered so that encoded payloads are deterministic.
pub type Segmentation = BTreeMap<String, String>;

/// A named occurrence reported to the analytics server.
///
/// Serializes to the Countly event object: `key`, `count`, optional `sum`,
/// optional `segmentation`, and `timestamp` in unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct Event {
    /// The event name.
    pub key: EventKey,
    /// How many times the event occurred. Always at least 1.
    pub count: u32,
    /// Optional numeric value attached to the event (e.g., purchase amount).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    /// Categorizing tags.
    #[serde(default, skip_serializing_if = "Segmentation::is_empty")]
    pub segmentation: Segmentation,
    /// When the event was recorded.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

/// Unvalidated wire form, checked by [`Event::new`] on deserialization.
#[derive(Deserialize)]
struct RawEvent {
    key: String,
    count: u32,
    #[serde(default)]
    sum: Option<f64>,
    #[serde(default)]
    segmentation: Segmentation,
    #[serde(with = "chrono::serde::ts_seconds")]
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawEvent> for Event {
    type Error = ValidationError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        Self::new(raw.key, raw.segmentation, raw.count, raw.sum, raw.timestamp)
    }
}

impl Event {
    /// Creates a validated event.
    ///
    /// The count must be at least 1, the sum (if any) must be finite and
    /// segmentation keys must be non-empty.
    pub fn new(
        key: impl Into<String>,
        segmentation: Segmentation,
        count: u32,
        sum: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let key = EventKey::new(key)?;
        if count == 0 {
            return Err(ValidationError::ZeroCount);
        }
        if let Some(value) = sum.filter(|value| !value.is_finite()) {
            return Err(ValidationError::NonFiniteSum { value });
        }
        if segmentation.keys().any(|k| k.trim().is_empty()) {
            return Err(ValidationError::EmptySegmentationKey);
        }

        Ok(Self {
            key,
            count,
            sum,
            segmentation,
            timestamp,
        })
    }

    /// Returns true if `other` would be aggregated into this event.
    pub fn same_bucket(&self, other: &Self) -> bool {
        self.key == other.key && self.segmentation == other.segmentation
    }

    /// Merges another occurrence of the same event into this one.
    ///
    /// Counts and sums add up; the timestamp moves to the midpoint of the two.
    pub fn absorb(&mut self, other: &Self) {
        debug_assert!(self.same_bucket(other));

        self.count = self.count.saturating_add(other.count);
        self.sum = match (self.sum, other.sum) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
        };
        let delta = other.timestamp - self.timestamp;
        self.timestamp += delta / 2;
    }
}
