use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for pbir operations
#[derive(Debug, Error)]
pub enum PbirError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{kind} '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        kind: SaveErrorKind,
        source: std::io::Error,
    },

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Config errors
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    // Report errors
    #[error("Report folder not found at '{0}'")]
    ReportNotFound(PathBuf),
}

/// Result type alias for pbir operations
pub type Result<T> = std::result::Result<T, PbirError>;

/// Classification of a failed write, used for user-facing save messages.
///
/// Saves are never retried automatically; the in-memory modified state is
/// left intact so the caller can try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveErrorKind {
    /// The directory permission was revoked or the file is read-only
    PermissionDenied,
    /// No space left on the target device
    DiskFull,
    /// The file was moved or deleted since the scan
    NotFound,
    /// Anything else
    Other,
}

impl SaveErrorKind {
    /// Classify an IO error from a write operation
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::PermissionDenied => SaveErrorKind::PermissionDenied,
            ErrorKind::StorageFull | ErrorKind::QuotaExceeded => SaveErrorKind::DiskFull,
            ErrorKind::NotFound => SaveErrorKind::NotFound,
            _ => SaveErrorKind::Other,
        }
    }

    /// User-facing hint for this failure class
    pub fn hint(&self) -> &'static str {
        match self {
            SaveErrorKind::PermissionDenied => "Grant folder access and try again.",
            SaveErrorKind::DiskFull => "Free up space and try again.",
            SaveErrorKind::NotFound => "The file may have been moved or deleted.",
            SaveErrorKind::Other => "",
        }
    }
}

impl std::fmt::Display for SaveErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SaveErrorKind::PermissionDenied => "Permission denied writing",
            SaveErrorKind::DiskFull => "Disk full writing",
            SaveErrorKind::NotFound => "File not found writing",
            SaveErrorKind::Other => "Failed to write",
        };
        write!(f, "{text}")
    }
}

impl PbirError {
    /// Build a classified write error from a raw IO error
    pub fn file_write(path: PathBuf, source: std::io::Error) -> Self {
        let kind = SaveErrorKind::from_io(&source);
        PbirError::FileWrite { path, kind, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_save_error_classification() {
        let denied = Error::new(ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            SaveErrorKind::from_io(&denied),
            SaveErrorKind::PermissionDenied
        );

        let missing = Error::new(ErrorKind::NotFound, "gone");
        assert_eq!(SaveErrorKind::from_io(&missing), SaveErrorKind::NotFound);

        let full = Error::new(ErrorKind::StorageFull, "full");
        assert_eq!(SaveErrorKind::from_io(&full), SaveErrorKind::DiskFull);

        let other = Error::new(ErrorKind::Interrupted, "eintr");
        assert_eq!(SaveErrorKind::from_io(&other), SaveErrorKind::Other);
    }

    #[test]
    fn test_file_write_message_mentions_path() {
        let err = PbirError::file_write(
            PathBuf::from("pages/p1/page.json"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("pages/p1/page.json"));
    }
}
