use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for settings loading, file conversion and batch execution.
///
/// Only [`Error::ConfigLoad`] is meant to abort a whole run. Everything else is
/// recovered at the line or file level and reported through logs and the
/// [`BatchReport`](crate::BatchReport).
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Settings file exists but could not be read or parsed.
    #[error("Failed to read settings file '{path}': {message}")]
    ConfigLoad {
        /// Settings file path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Settings file is absent; defaults are used instead.
    #[error("Settings file '{path}' is missing, using defaults")]
    ConfigMissing {
        /// Settings file path
        path: PathBuf,
    },

    /// Culture name not present in the built-in culture table.
    #[error("Unknown culture '{name}'")]
    UnknownCulture {
        /// Requested culture name
        name: String,
    },

    /// Input file could not be opened.
    #[error("File '{path}' could not be opened: {message}")]
    FileOpen {
        /// Input file path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// No conversion rule matched the line.
    #[error("Malformed line '{line}'")]
    Unclassified {
        /// Offending line
        line: String,
    },

    /// A file task panicked.
    #[error("Task for '{path}' panicked: {message}")]
    TaskPanicked {
        /// Input file path of the task
        path: PathBuf,
        /// Panic payload, if it was a string
        message: String,
    },

    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {message}")]
    ThreadPool {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a settings load error.
    #[must_use]
    pub fn config_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a missing settings error.
    #[must_use]
    pub fn config_missing(path: impl Into<PathBuf>) -> Self {
        Self::ConfigMissing { path: path.into() }
    }

    /// Creates an unknown culture error.
    #[must_use]
    pub fn unknown_culture(name: impl Into<String>) -> Self {
        Self::UnknownCulture { name: name.into() }
    }

    /// Creates a file open error.
    #[must_use]
    pub fn file_open(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        Self::FileOpen {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a line classification error.
    #[must_use]
    pub fn unclassified(line: impl Into<String>) -> Self {
        Self::Unclassified { line: line.into() }
    }

    /// Creates a task panic error.
    #[must_use]
    pub fn task_panicked(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TaskPanicked {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this error should abort the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigLoad { .. } | Self::ThreadPool { .. })
    }

    /// Returns true if this is a file open error.
    #[must_use]
    pub const fn is_file_open(&self) -> bool {
        matches!(self, Self::FileOpen { .. })
    }

    /// Returns true if this is a line classification error.
    #[must_use]
    pub const fn is_unclassified(&self) -> bool {
        matches!(self, Self::Unclassified { .. })
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.txt", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn test_config_load_is_fatal() {
        let err = Error::config_load("settings.xml", "unexpected end of input");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("settings.xml"));
    }

    #[test]
    fn test_config_missing_is_not_fatal() {
        let err = Error::config_missing("settings.xml");
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("using defaults"));
    }

    #[test]
    fn test_file_open_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::file_open("missing.txt", &io_err);
        assert!(err.is_file_open());
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_unclassified_error() {
        let err = Error::unclassified("not-a-number");
        assert!(err.is_unclassified());
        assert_eq!(err.to_string(), "Malformed line 'not-a-number'");
    }

    #[test]
    fn test_error_clone() {
        let err = Error::unknown_culture("xx-YY");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
