use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while
/// exporting locale files to a sheet or importing them back.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a sheet range is not valid A1 notation.
    #[error("invalid sheet range '{0}'")]
    InvalidRange(String),

    /// Raised when a locale file that must exist is absent.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a locale file does not hold a JSON object.
    #[error("locale file {0} must contain a JSON object")]
    InvalidLocale(PathBuf),

    /// Raised when the OAuth client secret file cannot be found.
    #[error("client secret file not found: {0}")]
    MissingCredentials(PathBuf),

    /// Raised when no stored access token is available.
    #[error("no stored token at {0}; authorize the client first")]
    MissingToken(PathBuf),

    /// Raised when the client secret file lacks a required entry.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Raised when a language code is not part of the configured set.
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),

    /// Raised when the configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
