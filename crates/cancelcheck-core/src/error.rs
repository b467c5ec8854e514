//! Error types for the cancellation-detection backend.
//!
//! ## Hierarchy
//!
//! ```text
//! BackendError (top-level)
//! └── ConfigError   (configuration record validation / file loading)
//! ```
//!
//! A detected cancellation is not an error: it is delivered to the
//! [`CancellationHandler`](crate::handler::CancellationHandler) and never
//! surfaces here.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Top-level error type for the backend lifecycle.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BackendError {
    /// A host collaborator required at setup was not supplied.
    #[error("Interflop backend error: required capability `{capability}` not provided by the host")]
    MissingCapability {
        /// Name of the missing capability
        capability: &'static str,
    },

    /// The command-line entry point was used without an argument parser.
    #[error(
        "Interflop backend error: argument parser not implemented\n\
         Provide implementation or use configure to configure the backend"
    )]
    ParserUnavailable,

    /// A threshold option was given a value that is not a positive integer.
    #[error("--{option} invalid value provided, must be a positive integer (got `{value}`)")]
    InvalidThreshold {
        /// Option name without the leading dashes
        option: &'static str,
        /// The rejected raw value
        value: String,
    },

    /// The argument parser rejected the command line.
    #[error("Command line error: {0}")]
    CommandLine(String),

    /// Configuration record error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BackendError {
    /// Creates a new missing capability error.
    #[must_use]
    pub fn missing_capability(capability: &'static str) -> Self {
        Self::MissingCapability { capability }
    }

    /// Creates a new invalid threshold error.
    #[must_use]
    pub fn invalid_threshold(option: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidThreshold {
            option,
            value: value.into(),
        }
    }

    /// Returns `true` if the host must abort rather than continue.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::MissingCapability { .. } | Self::ParserUnavailable => true,
            Self::InvalidThreshold { .. }
            | Self::CommandLine(_)
            | Self::Config(_) => false,
        }
    }
}

/// Errors raised while loading or storing a configuration record.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("Cannot read config file `{path}`: {source}")]
    FileRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file or its parent directory could not be written.
    #[error("Cannot write config file `{path}`: {source}")]
    FileWrite {
        /// Path that was being written or created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded as JSON.
    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A configuration file contains malformed JSON.
    #[error("Cannot parse config file `{path}`: {source}")]
    ParseError {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Path the failed operation was touching, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FileRead { path, .. }
            | Self::FileWrite { path, .. }
            | Self::ParseError { path, .. } => Some(path.as_path()),
            Self::Serialize(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(BackendError::missing_capability("panic").is_fatal());
        assert!(BackendError::ParserUnavailable.is_fatal());
        assert!(!BackendError::invalid_threshold("threshold-binary32", "abc").is_fatal());
        assert!(!BackendError::CommandLine("bad".into()).is_fatal());
    }

    #[test]
    fn invalid_threshold_message_names_option() {
        let err = BackendError::invalid_threshold("threshold-binary64", "-5");
        let msg = err.to_string();
        assert!(msg.starts_with("--threshold-binary64 invalid value provided"));
        assert!(msg.contains("`-5`"));
    }

    #[test]
    fn config_error_converts() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: BackendError = ConfigError::FileWrite {
            path: PathBuf::from("/etc/conf.json"),
            source,
        }
        .into();
        assert!(matches!(err, BackendError::Config(_)));
        assert!(err.to_string().contains("Cannot write config file"));
    }

    #[test]
    fn config_error_path() {
        let err = ConfigError::FileRead {
            path: PathBuf::from("conf.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "absent"),
        };
        assert_eq!(err.path(), Some(std::path::Path::new("conf.json")));
    }
}
