use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unified error type for obs-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Project {0} not found")]
    ProjectNotFound(String),

    #[error("Incomplete patch of {}: missed {missing:?}", path.display())]
    IncompletePatch { path: PathBuf, missing: Vec<String> },

    #[error("Command `{command}` failed ({status}): {stderr}")]
    ExternalCommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results in obs-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create an invalid version error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidVersion(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Attach the offending path to an I/O error
    pub fn fs(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ReleaseError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the error was raised by an external tool or remote call
    pub fn is_external(&self) -> bool {
        matches!(self, ReleaseError::ExternalCommandFailed { .. })
    }
}

impl From<walkdir::Error> for ReleaseError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        ReleaseError::Filesystem { path, source }
    }
}
