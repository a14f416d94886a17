//! Error types for collection_sync

use std::fmt;

/// Unified error type for collection_sync operations
#[derive(Debug)]
pub enum CollectionError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// Failed to parse JSON response
    Parse(serde_json::Error),
    /// Run mode was not one of: all, checked, aged, empty
    InvalidRunMode(String),
    /// Requested sheet does not exist in the workbook
    SheetNotFound { sheet: String, available: Vec<String> },
    /// Sheet has fewer columns than the expected schema
    ColumnMismatch { expected: usize, found: usize },
    /// Workbook stayed locked for writing after all retry attempts
    FileLocked { path: String, attempts: u32 },
    /// Failed to read the workbook file
    WorkbookRead(String),
    /// Failed to write the workbook file
    WorkbookWrite(String),
    /// File I/O error
    Io(std::io::Error),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::Network(e) => write!(f, "Network error: {}", e),
            CollectionError::Parse(e) => write!(f, "Parse error: {}", e),
            CollectionError::InvalidRunMode(mode) => {
                write!(
                    f,
                    "Invalid run mode '{}'. Expected one of: all, checked, aged, empty",
                    mode
                )
            }
            CollectionError::SheetNotFound { sheet, available } => {
                write!(
                    f,
                    "Sheet '{}' not found in workbook. Available sheets: {}",
                    sheet,
                    available.join(", ")
                )
            }
            CollectionError::ColumnMismatch { expected, found } => {
                write!(
                    f,
                    "Expected {} columns but found {} in the sheet",
                    expected, found
                )
            }
            CollectionError::FileLocked { path, attempts } => {
                write!(
                    f,
                    "File '{}' is still locked after {} attempts",
                    path, attempts
                )
            }
            CollectionError::WorkbookRead(msg) => write!(f, "Workbook read error: {}", msg),
            CollectionError::WorkbookWrite(msg) => write!(f, "Workbook write error: {}", msg),
            CollectionError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Network(e) => Some(e),
            CollectionError::Parse(e) => Some(e),
            CollectionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CollectionError {
    fn from(err: reqwest::Error) -> Self {
        CollectionError::Network(err)
    }
}

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        CollectionError::Parse(err)
    }
}

impl From<std::io::Error> for CollectionError {
    fn from(err: std::io::Error) -> Self {
        CollectionError::Io(err)
    }
}

/// Result alias for collection_sync operations
pub type Result<T> = std::result::Result<T, CollectionError>;
