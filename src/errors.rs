//! Sync error taxonomy

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote unavailable at {url}: {reason}")]
    RemoteUnavailable { url: String, reason: String },

    #[error("Malformed archive reference '{reference}': {reason}")]
    MalformedArchiveReference { reference: String, reason: String },

    #[error("Game record is missing required header field '{field}'")]
    MissingRequiredField { field: &'static str },

    #[error("Filesystem operation failed on {path}: {source}")]
    FilesystemFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Category used for per-run error counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RemoteUnavailable,
    MalformedArchiveReference,
    MissingRequiredField,
    FilesystemFailure,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::RemoteUnavailable { .. } => ErrorKind::RemoteUnavailable,
            SyncError::MalformedArchiveReference { .. } => ErrorKind::MalformedArchiveReference,
            SyncError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            SyncError::FilesystemFailure { .. } => ErrorKind::FilesystemFailure,
        }
    }

    pub(crate) fn remote(url: &str, reason: impl ToString) -> Self {
        SyncError::RemoteUnavailable {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(reference: &str, reason: impl ToString) -> Self {
        SyncError::MalformedArchiveReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn filesystem(path: &str, source: std::io::Error) -> Self {
        SyncError::FilesystemFailure {
            path: path.to_string(),
            source,
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorKind::RemoteUnavailable => "remote unavailable",
            ErrorKind::MalformedArchiveReference => "malformed archive reference",
            ErrorKind::MissingRequiredField => "missing required field",
            ErrorKind::FilesystemFailure => "filesystem failure",
        }
    }
}
