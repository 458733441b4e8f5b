//! Error types for Teachmate
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Teachmate operations
///
/// The first three variants are the closed set of failures the generation
/// and ingestion paths can report to a user. The rest cover configuration,
/// storage, export and transport plumbing.
#[derive(Error, Debug)]
pub enum TeachmateError {
    /// No API key configured; no request was attempted
    #[error("API key is not configured. Run `teachmate auth set` to store one.")]
    CredentialMissing,

    /// Every model candidate in the fallback chain failed
    #[error("All models failed. Last error: {0}")]
    AllCandidatesExhausted(String),

    /// Uploaded file has an extension we cannot extract text from
    #[error("Unsupported file type .{0}. Only PDF, DOCX, TXT and MD are supported.")]
    UnsupportedFormat(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, bad responses)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Document text extraction errors (corrupt or unreadable files)
    #[error("Document error: {0}")]
    Document(String),

    /// Export rendering errors
    #[error("Export error: {0}")]
    Export(String),

    /// Requested session, message or document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Chat store errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Zip container errors (.docx packages)
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type alias for Teachmate operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
