//! Tracker configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use volusage_shared::errors::{VolusageError, VolusageResult};

/// Log level used when the tracker notices a duplicate claim or an
/// unmatched free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MisuseLogLevel {
    Off,
    Debug,
    #[default]
    Warn,
}

/// Options for a `VolumeUsageTracker`.
///
/// Unknown fields are ignored so the volume manager can embed this in a
/// larger config document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerOptions {
    pub misuse_log_level: MisuseLogLevel,
}

impl TrackerOptions {
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> VolusageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn load(path: &Path) -> VolusageResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VolusageError::Storage(format!(
                "Failed to read tracker options {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = TrackerOptions::default();
        assert_eq!(options.misuse_log_level, MisuseLogLevel::Warn);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let options = TrackerOptions::from_json("{}").unwrap();
        assert_eq!(options, TrackerOptions::default());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let options = TrackerOptions::from_json(
            r#"{"misuse_log_level": "off", "plugin_dir": "/var/lib/csi"}"#,
        )
        .unwrap();
        assert_eq!(options.misuse_log_level, MisuseLogLevel::Off);
    }

    #[test]
    fn test_bad_level_rejected() {
        let result = TrackerOptions::from_json(r#"{"misuse_log_level": "loud"}"#);
        assert!(matches!(result, Err(VolusageError::Config(_))));
    }

    #[test]
    fn test_malformed_document_rejected() {
        let result = TrackerOptions::from_json("{misuse_log_level");
        assert!(matches!(result, Err(VolusageError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"misuse_log_level": "debug"}}"#).unwrap();

        let options = TrackerOptions::load(file.path()).unwrap();
        assert_eq!(options.misuse_log_level, MisuseLogLevel::Debug);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TrackerOptions::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(VolusageError::Storage(_))));
    }
}
