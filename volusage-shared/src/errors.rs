//! Error taxonomy for volusage.
//!
//! Claim bookkeeping itself never fails. Errors only come from the edges:
//! loading tracker options and parsing log filters.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type VolusageResult<T> = Result<T, VolusageError>;

#[derive(Error, Debug)]
pub enum VolusageError {
    /// Tracker options or a log filter failed to parse.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading an options file or other on-disk input failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for VolusageError {
    fn from(err: std::io::Error) -> Self {
        VolusageError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for VolusageError {
    fn from(err: serde_json::Error) -> Self {
        VolusageError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = VolusageError::Config("unknown variant `loud`".to_string());
        assert_eq!(err.to_string(), "configuration error: unknown variant `loud`");

        let err = VolusageError::Storage("options.json: not found".to_string());
        assert_eq!(err.to_string(), "storage error: options.json: not found");
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: VolusageError = io.into();
        assert!(matches!(err, VolusageError::Storage(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_json_error_maps_to_config() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: VolusageError = json_err.into();
        assert!(matches!(err, VolusageError::Config(_)));
    }
}
