//! Error types for d20stats.
//!
//! This module defines a hierarchical error taxonomy using `thiserror`. Errors compose
//! via `?` and `From` conversions up to [`AppError`].
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned by the binary
//!   - [`InputError`] - Archive file missing, unreadable, or not valid under its encoding
//!   - [`ParseError`] - Decoding failures inside already-read data
//!   - [`ConfigError`] - Config file unreadable or invalid
//!   - [`LoggingError`] - Tracing subscriber setup failed
//!   - `std::io::Error` - Writing the report failed
//!
//! # Recovery Strategy
//!
//! None. The archive is exported once per session and treated as all-or-nothing: every
//! error aborts the run before any report is printed. There is no transient failure
//! mode, so nothing is retried.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::source::ArchiveFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error encompassing all failure modes.
///
/// # Examples
///
/// ```no_run
/// use d20stats::model::error::{AppError, InputError};
///
/// fn run() -> Result<(), AppError> {
///     // InputError converts to AppError via From
///     open_archive()?;
///     Ok(())
/// }
/// # fn open_archive() -> Result<(), InputError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// The archive could not be opened or decoded.
    #[error("Failed to read archive: {0}")]
    Input(#[from] InputError),

    /// A message inside the archive could not be interpreted.
    #[error("Failed to parse archive contents: {0}")]
    Parse(#[from] ParseError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The report could not be written to stdout.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors encountered when reading the archive file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The archive path does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use d20stats::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.json"),
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.json"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path as given on the command line.
        path: PathBuf,
    },

    /// The file was read but its content is not valid under the chosen encoding.
    ///
    /// Covers invalid base64, invalid JSON, and JSON that does not have the
    /// shape of a message stream.
    #[error("{path} is not a valid {format} chat archive: {message}")]
    Malformed {
        /// Archive path.
        path: PathBuf,
        /// Encoding the file was decoded with.
        format: ArchiveFormat,
        /// Decoder error message.
        message: String,
    },

    /// Any other I/O failure (permissions, disk errors).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered while decoding JSON data.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A reader did not yield a valid message stream.
    ///
    /// `message` is the `serde_json` error text, including line and column.
    ///
    /// # Examples
    ///
    /// ```
    /// use d20stats::model::error::ParseError;
    ///
    /// let err = ParseError::InvalidJson {
    ///     message: "expected value at line 1 column 1".to_string(),
    /// };
    /// assert!(err.to_string().contains("line 1 column 1"));
    /// ```
    #[error("Invalid JSON: {message}")]
    InvalidJson {
        /// Parser error message.
        message: String,
    },

    /// A message claims to be a roll result but its content is not serialized roll data.
    ///
    /// Raised during lazy population of embedded rolls. Fatal for the whole run.
    ///
    /// # Examples
    ///
    /// ```
    /// use d20stats::model::error::ParseError;
    ///
    /// let err = ParseError::MalformedEmbeddedRoll {
    ///     message_type: "rollresult".to_string(),
    ///     message: "expected value at line 1 column 1".to_string(),
    /// };
    /// assert!(err.to_string().contains("rollresult"));
    /// ```
    #[error("Malformed embedded roll in '{message_type}' message: {message}")]
    MalformedEmbeddedRoll {
        /// The message's type tag.
        message_type: String,
        /// Parser error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_converts_to_app_error() {
        let err: AppError = InputError::FileNotFound {
            path: PathBuf::from("chat.json"),
        }
        .into();
        assert!(matches!(err, AppError::Input(_)));
        assert!(err.to_string().contains("chat.json"));
    }

    #[test]
    fn parse_error_converts_to_app_error() {
        let err: AppError = ParseError::MalformedEmbeddedRoll {
            message_type: "gmrollresult".to_string(),
            message: "EOF".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("gmrollresult"));
    }

    #[test]
    fn malformed_input_names_path_and_format() {
        let err = InputError::Malformed {
            path: PathBuf::from("chat.b64"),
            format: ArchiveFormat::Base64,
            message: "Invalid symbol 33, offset 4.".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("chat.b64"));
        assert!(text.contains("base64"));
        assert!(text.contains("Invalid symbol"));
    }

    #[test]
    fn io_error_converts_to_input_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: InputError = io.into();
        assert!(matches!(err, InputError::Io(_)));
    }
}
