//! Device identity management.
//!
//! Each device gets a persistent UUID stored in `device.json`, sent as the
//! Countly `device_id` so that sessions from separate runs are attributed to
//! the same device.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Device identity stored in `device.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Persistent UUID for this device.
    pub device_id: String,
    /// Human-friendly label, defaulting to the hostname.
    pub label: String,
}

/// Returns the path to device.json in the XDG data directory.
pub fn device_json_path() -> Result<PathBuf> {
    let data_dir = crate::config::dirs_data_path().context("could not determine data directory")?;
    Ok(data_dir.join("device.json"))
}

/// Loads the device identity, creating and saving a new one if missing.
pub fn load_or_init_device() -> Result<DeviceIdentity> {
    load_or_init_at(&device_json_path()?)
}

/// Replaces the device ID with a fresh UUID, keeping the label.
pub fn reset_device() -> Result<DeviceIdentity> {
    reset_at(&device_json_path()?)
}

/// Loads device identity from a specific path.
///
/// Returns `None` if the file doesn't exist.
fn load_from(path: &Path) -> Result<Option<DeviceIdentity>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let identity: DeviceIdentity =
                serde_json::from_str(&content).context("failed to parse device.json")?;
            Ok(Some(identity))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).context("failed to read device.json"),
    }
}

fn load_or_init_at(path: &Path) -> Result<DeviceIdentity> {
    if let Some(existing) = load_from(path)? {
        return Ok(existing);
    }

    let identity = DeviceIdentity {
        device_id: Uuid::new_v4().to_string(),
        label: default_label(),
    };
    save_to(path, &identity)?;
    tracing::debug!(device_id = %identity.device_id, "created device identity");
    Ok(identity)
}

fn reset_at(path: &Path) -> Result<DeviceIdentity> {
    let label = load_from(path)?.map_or_else(default_label, |existing| existing.label);
    let identity = DeviceIdentity {
        device_id: Uuid::new_v4().to_string(),
        label,
    };
    save_to(path, &identity)?;
    Ok(identity)
}

fn default_label() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Writes device identity to a specific path.
fn save_to(path: &Path, identity: &DeviceIdentity) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let json = serde_json::to_string_pretty(identity).context("failed to serialize identity")?;
    std::fs::write(path, json).context("failed to write device.json")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_new_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");

        let identity = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert!(!identity.label.is_empty());
        Uuid::parse_str(&identity.device_id).unwrap();
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");

        let first = load_or_init_at(&path).unwrap();
        let second = load_or_init_at(&path).unwrap();
        assert_eq!(first.device_id, second.device_id);
        assert_eq!(first.label, second.label);
    }

    #[test]
    fn test_reset_changes_id_and_keeps_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        save_to(
            &path,
            &DeviceIdentity {
                device_id: "old-id".to_string(),
                label: "testbox".to_string(),
            },
        )
        .unwrap();

        let reset = reset_at(&path).unwrap();
        assert_ne!(reset.device_id, "old-id");
        assert_eq!(reset.label, "testbox");

        let loaded = load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.device_id, reset.device_id);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        assert!(load_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_from(&path).is_err());
    }
}
