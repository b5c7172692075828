use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::PartName;

/// Error type for configuration, argument, and stage failures.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Missing corpus root or an unusable preset override.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Positional arguments were supplied.
    #[error("unexpected positional arguments: {}", .0.join(" "))]
    UnexpectedArguments(Vec<String>),
    /// Unknown flag or malformed flag value.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Network or mirror fetch failure.
    #[error("failed fetching '{url}': {reason}")]
    Fetch {
        /// Requested URL.
        url: String,
        /// Underlying failure.
        reason: String,
    },
    /// Corrupt or unreadable archive.
    #[error("failed extracting archive {}: {reason}", archive.display())]
    Extract {
        /// Archive being unpacked.
        archive: PathBuf,
        /// Underlying failure.
        reason: String,
    },
    /// Normalization of a part failed.
    #[error("corpus part '{part}' could not be prepared: {reason}")]
    Transform {
        /// Canonical part name.
        part: PartName,
        /// What was wrong with the part.
        reason: String,
    },
    /// An audio file could not be read, trimmed or written.
    #[error("audio file {} could not be processed: {reason}", path.display())]
    Audio {
        /// Audio file being read or written.
        path: PathBuf,
        /// Underlying decoder or encoder failure.
        reason: String,
    },
    /// A data directory is missing required files or has malformed entries.
    #[error("data directory {} is invalid: {details}", dir.display())]
    Manifest {
        /// Data directory.
        dir: PathBuf,
        /// What is missing or malformed.
        details: String,
    },
    /// The downstream pipeline exited non-zero.
    #[error("downstream pipeline exited with status {code}")]
    Pipeline {
        /// Exit status of the child process.
        code: i32,
    },
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PrepError {
    /// Process exit code reported for this error.
    ///
    /// Argument errors exit with `2`, downstream pipeline failures forward the
    /// child's status, and everything else exits with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            PrepError::UnexpectedArguments(_) | PrepError::InvalidArguments(_) => 2,
            PrepError::Pipeline { code } if *code != 0 => *code,
            _ => 1,
        }
    }

    pub(crate) fn transform(part: impl Into<PartName>, reason: impl Into<String>) -> Self {
        PrepError::Transform {
            part: part.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn manifest(dir: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        PrepError::Manifest {
            dir: dir.into(),
            details: details.into(),
        }
    }
}
