//! Programmatic configuration record.
//!
//! [`CheckCancellationConf`] is the bulk-configuration input accepted by
//! [`Backend::configure`](crate::backend::Backend::configure). It is copied
//! into the context verbatim, without validation. It can also be stored to /
//! restored from JSON.
//!
//! # Example
//!
//! ```rust
//! use cancelcheck_core::config::CheckCancellationConf;
//!
//! let conf = CheckCancellationConf { threshold_b32: 3, threshold_b64: 9 };
//! let json = serde_json::to_string(&conf).unwrap();
//! assert_eq!(json, r#"{"threshold_b32":3,"threshold_b64":9}"#);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable that silences the load banner when set to `True`.
pub const SILENT_LOAD_ENV: &str = "VFC_BACKENDS_SILENT_LOAD";

/// Option key for the binary32 threshold.
pub const KEY_THRESHOLD_B32: &str = "threshold-binary32";

/// Option key for the binary64 threshold.
pub const KEY_THRESHOLD_B64: &str = "threshold-binary64";

/// Ordered pair of thresholds: binary32 first, binary64 second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckCancellationConf {
    /// Cancellation threshold for binary32 operations. Default: **0**.
    pub threshold_b32: u32,
    /// Cancellation threshold for binary64 operations. Default: **0**.
    pub threshold_b64: u32,
}

impl CheckCancellationConf {
    /// Load a record from a JSON file at `path`.
    ///
    /// Missing fields default to zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be opened and
    /// [`ConfigError::ParseError`] if the JSON is malformed.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write this record to `path` as pretty-printed JSON, creating parent
    /// directories if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileWrite`] if the directory cannot be created or
    /// the file cannot be written.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(ConfigError::Serialize)?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_is_zero() {
        let conf = CheckCancellationConf::default();
        assert_eq!(conf.threshold_b32, 0);
        assert_eq!(conf.threshold_b64, 0);
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("conf.json");
        let conf = CheckCancellationConf {
            threshold_b32: 12,
            threshold_b64: 40,
        };
        conf.to_json(&path).unwrap();
        assert_eq!(CheckCancellationConf::from_json(&path).unwrap(), conf);
    }

    #[test]
    fn missing_fields_default() {
        let conf: CheckCancellationConf = serde_json::from_str(r#"{"threshold_b64": 7}"#).unwrap();
        assert_eq!(conf.threshold_b32, 0);
        assert_eq!(conf.threshold_b64, 7);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ threshold_b32: ").unwrap();
        let err = CheckCancellationConf::from_json(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn unwritable_path_is_write_error() {
        let dir = tempdir().unwrap();
        // A regular file cannot be used as a parent directory.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("conf.json");

        let err = CheckCancellationConf::default().to_json(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileWrite { .. }), "got {err:?}");
        assert!(err.to_string().starts_with("Cannot write config file"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = CheckCancellationConf::from_json(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
