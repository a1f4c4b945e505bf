use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Machine-checkable classification of every [`TreecatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    DirectoryScanFailed,
    FileTooLarge,
    PermissionDenied,
    FileNotFound,
    IsDirectory,
    InvalidEncoding,
    ReadFailed,
    IgnoreFileUnreadable,
    InvalidPattern,
    OutputFailed,
    ConfigSaveFailed,
    ConfigEmpty,
    InvalidConfig,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::DirectoryScanFailed => "DIRECTORY_SCAN_FAILED",
            ErrorKind::FileTooLarge => "FILE_TOO_LARGE",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::FileNotFound => "FILE_NOT_FOUND",
            ErrorKind::IsDirectory => "IS_DIRECTORY",
            ErrorKind::InvalidEncoding => "INVALID_ENCODING",
            ErrorKind::ReadFailed => "READ_FAILED",
            ErrorKind::IgnoreFileUnreadable => "IGNORE_FILE_UNREADABLE",
            ErrorKind::InvalidPattern => "INVALID_PATTERN",
            ErrorKind::OutputFailed => "OUTPUT_FAILED",
            ErrorKind::ConfigSaveFailed => "CONFIG_SAVE_FAILED",
            ErrorKind::ConfigEmpty => "CONFIG_EMPTY",
            ErrorKind::InvalidConfig => "INVALID_CONFIG",
        }
    }

    /// Whether an error of this kind is confined to a single file.
    ///
    /// Local errors are recorded and the scan moves on; everything else
    /// fails the scan.
    pub fn is_local(self) -> bool {
        matches!(
            self,
            ErrorKind::FileTooLarge
                | ErrorKind::PermissionDenied
                | ErrorKind::FileNotFound
                | ErrorKind::IsDirectory
                | ErrorKind::InvalidEncoding
                | ErrorKind::ReadFailed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error)]
pub enum TreecatError {
    #[error("Directory scan failed on {path}: {source}")]
    DirectoryScan {
        path: PathBuf,
        source: io::Error,
    },
    #[error("File too large: {path} ({size} bytes, max {max_allowed})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_allowed: u64,
    },
    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        source: io::Error,
    },
    #[error("File not found: {path}")]
    FileNotFound {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Is a directory: {path}")]
    IsDirectory { path: PathBuf },
    #[error("Invalid UTF-8 in {path}: {source}")]
    InvalidEncoding {
        path: PathBuf,
        source: std::str::Utf8Error,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Cannot read ignore file {path}: {source}")]
    IgnoreFile {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },
    #[error("Failed to write output to {target}: {source}")]
    Output {
        target: String,
        source: io::Error,
    },
    #[error("Failed to save config to {path}: {source}")]
    ConfigSave {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Config file is empty: {path}")]
    ConfigEmpty { path: PathBuf },
    #[error("Invalid config file {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

impl TreecatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreecatError::DirectoryScan { .. } => ErrorKind::DirectoryScanFailed,
            TreecatError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            TreecatError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            TreecatError::FileNotFound { .. } => ErrorKind::FileNotFound,
            TreecatError::IsDirectory { .. } => ErrorKind::IsDirectory,
            TreecatError::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
            TreecatError::Io { .. } => ErrorKind::ReadFailed,
            TreecatError::IgnoreFile { .. } => ErrorKind::IgnoreFileUnreadable,
            TreecatError::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            TreecatError::Output { .. } => ErrorKind::OutputFailed,
            TreecatError::ConfigSave { .. } => ErrorKind::ConfigSaveFailed,
            TreecatError::ConfigEmpty { .. } => ErrorKind::ConfigEmpty,
            TreecatError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// The offending path, when the error is tied to one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            TreecatError::DirectoryScan { path, .. }
            | TreecatError::FileTooLarge { path, .. }
            | TreecatError::PermissionDenied { path, .. }
            | TreecatError::FileNotFound { path, .. }
            | TreecatError::IsDirectory { path }
            | TreecatError::InvalidEncoding { path, .. }
            | TreecatError::Io { path, .. }
            | TreecatError::IgnoreFile { path, .. }
            | TreecatError::ConfigSave { path, .. }
            | TreecatError::ConfigEmpty { path }
            | TreecatError::InvalidConfig { path, .. } => Some(path),
            TreecatError::InvalidPattern { .. } | TreecatError::Output { .. } => None,
        }
    }

    /// Maps an I/O failure on a single file onto the local error kinds.
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => TreecatError::FileNotFound { path, source },
            io::ErrorKind::PermissionDenied => TreecatError::PermissionDenied { path, source },
            io::ErrorKind::IsADirectory => TreecatError::IsDirectory { path },
            _ => TreecatError::Io { path, source },
        }
    }

    pub(crate) fn directory_scan(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TreecatError::DirectoryScan {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn output(target: impl Into<String>, source: io::Error) -> Self {
        TreecatError::Output {
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_read_classifies_by_io_kind() {
        let not_found = TreecatError::file_read("a", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(not_found.kind(), ErrorKind::FileNotFound);

        let denied = TreecatError::file_read("a", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(denied.kind(), ErrorKind::PermissionDenied);

        let is_dir = TreecatError::file_read("a", io::Error::from(io::ErrorKind::IsADirectory));
        assert_eq!(is_dir.kind(), ErrorKind::IsDirectory);

        let other = TreecatError::file_read("a", io::Error::other("boom"));
        assert_eq!(other.kind(), ErrorKind::ReadFailed);
        assert_eq!(other.path(), Some(Path::new("a")));
    }

    #[test]
    fn codes_are_screaming_snake_case() {
        assert_eq!(ErrorKind::DirectoryScanFailed.to_string(), "DIRECTORY_SCAN_FAILED");
        assert_eq!(
            serde_json::to_string(&ErrorKind::FileTooLarge).unwrap(),
            "\"FILE_TOO_LARGE\""
        );
    }

    #[test]
    fn only_file_errors_are_local() {
        assert!(ErrorKind::FileTooLarge.is_local());
        assert!(ErrorKind::IsDirectory.is_local());
        assert!(!ErrorKind::DirectoryScanFailed.is_local());
        assert!(!ErrorKind::IgnoreFileUnreadable.is_local());
    }
}
