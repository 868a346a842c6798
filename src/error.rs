use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SentinelError` and maps other errors to
/// convert to a `SentinelError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SentinelError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// A simulation operation was requested before any model was initialized.
    NotInitialized,
    InvalidConfig(String),
    InvalidLogLevel(String),
    ServerError(String),
    ReportError(String),
}

impl From<io::Error> for SentinelError {
    fn from(error: io::Error) -> Self {
        SentinelError::IoError(error)
    }
}

impl From<serde_json::Error> for SentinelError {
    fn from(error: serde_json::Error) -> Self {
        SentinelError::JsonError(error)
    }
}

impl From<csv::Error> for SentinelError {
    fn from(error: csv::Error) -> Self {
        SentinelError::CSVError(error)
    }
}

impl std::error::Error for SentinelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SentinelError::IoError(error) => Some(error),
            SentinelError::JsonError(error) => Some(error),
            SentinelError::CSVError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for SentinelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SentinelError::IoError(error) => write!(f, "I/O error: {error}"),
            SentinelError::JsonError(error) => write!(f, "JSON error: {error}"),
            SentinelError::CSVError(error) => write!(f, "CSV error: {error}"),
            SentinelError::NotInitialized => write!(f, "Simulation not initialized"),
            SentinelError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            SentinelError::InvalidLogLevel(msg) => write!(f, "Invalid log level: {msg}"),
            SentinelError::ServerError(msg) => write!(f, "Server error: {msg}"),
            SentinelError::ReportError(msg) => write!(f, "Report error: {msg}"),
        }
    }
}
