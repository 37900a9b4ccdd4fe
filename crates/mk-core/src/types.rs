//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty or whitespace-only.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The host used a scheme other than http or https.
    #[error("unsupported host scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// An event count of zero was supplied.
    #[error("event count must be at least 1")]
    ZeroCount,

    /// The event sum was NaN or infinite.
    #[error("event sum must be finite, got {value}")]
    NonFiniteSum { value: f64 },

    /// A segmentation entry had an empty key.
    #[error("segmentation keys cannot be empty")]
    EmptySegmentationKey,
}

/// Generates a validated string newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// The application key issued by the analytics server.
    AppKey, "app key"
);

define_string_id!(
    /// The name of a logged event (e.g., "purchase", "level_complete").
    EventKey, "event key"
);

define_string_id!(
    /// An opaque identifier the server uses to attribute sessions to a device.
    ///
    /// Usually a UUID, but any non-empty string is accepted so callers can
    /// reuse identifiers issued elsewhere.
    DeviceId, "device ID"
);

/// The base URL of the analytics server.
///
/// Normalized on construction: surrounding whitespace and trailing slashes are
/// removed, and a bare host name gets an `https://` scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Host(String);

impl Host {
    /// Creates a new host after validation and normalization.
    pub fn new(host: impl Into<String>) -> Result<Self, ValidationError> {
        let host = host.into();
        let trimmed = host.trim();
        let (scheme, rest) = trimmed
            .split_once("://")
            .map_or(("https".to_string(), trimmed), |(scheme, rest)| {
                (scheme.to_ascii_lowercase(), rest)
            });
        let rest = rest.trim_end_matches('/');

        if rest.is_empty() {
            return Err(ValidationError::Empty { field: "host" });
        }
        if scheme != "http" && scheme != "https" {
            return Err(ValidationError::UnsupportedScheme { scheme });
        }

        Ok(Self(format!("{scheme}://{rest}")))
    }

    /// Returns the normalized base URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins an absolute path (e.g. `/i`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.0)
    }
}

impl TryFrom<String> for Host {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Host> for String {
    fn from(host: Host) -> Self {
        host.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
