/*
 * Defines the error taxonomy shared by the portable logic and the Win32 glue.
 * Resource lookups, template parsing, capacity limits, modal re-entrance and
 * host API failures each map to one variant so callers can decide whether a
 * failure is worth surfacing or only worth a log line.
 */
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A dialog template or other named resource could not be found.
    ResourceNotFound(String),
    /// Template bytes did not have the expected layout.
    MalformedTemplate(String),
    /// A fixed-capacity table or control budget is exhausted.
    CapacityExceeded(String),
    /// A modal dialog of the same kind is already being shown.
    DialogBusy(String),
    InvalidHandle(String),
    OperationFailed(String),
    InitializationFailed(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::ResourceNotFound(s) => write!(f, "Resource not found: {s}"),
            PlatformError::MalformedTemplate(s) => write!(f, "Malformed dialog template: {s}"),
            PlatformError::CapacityExceeded(s) => write!(f, "Capacity exceeded: {s}"),
            PlatformError::DialogBusy(s) => write!(f, "Dialog busy: {s}"),
            PlatformError::InvalidHandle(s) => write!(f, "Invalid handle: {s}"),
            PlatformError::OperationFailed(s) => write!(f, "Operation failed: {s}"),
            PlatformError::InitializationFailed(s) => write!(f, "Initialization failed: {s}"),
        }
    }
}

impl std::error::Error for PlatformError {}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        PlatformError::OperationFailed(format!("{} ({:?})", err.message(), err.code()))
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
