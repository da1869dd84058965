/*!
 * Error types for the subconv library.
 *
 * This module contains custom error types for the different layers of the
 * engine, using the thiserror crate for ergonomic error definitions.
 * Per-entry parse failures are not errors: they are collected as
 * `ParseWarning`s next to the partial document.
 */

use thiserror::Error;

use crate::formats::SubtitleFormat;

/// Errors raised by a single format grammar or by the timing model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// A zero, negative or non-finite frame rate was supplied
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    /// The input contained text but not a single entry could be parsed
    #[error("No valid {format} entries found ({malformed} malformed)")]
    NoEntries {
        /// Grammar that attempted the parse
        format: SubtitleFormat,
        /// Number of entries rejected as malformed
        malformed: usize,
    },
}

/// Errors that abort a whole conversion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// No grammar cleared the detection threshold
    #[error("Unknown subtitle format (scores: {})", format_scores(.scores))]
    UnknownFormat {
        /// Confidence reported by every registered grammar
        scores: Vec<(SubtitleFormat, f64)>,
    },

    /// The requested output format is not registered
    #[error("Unsupported target format: {0}")]
    UnsupportedTargetFormat(String),

    /// The explicitly requested input format is not registered
    #[error("Unsupported source format: {0}")]
    UnsupportedSourceFormat(String),

    /// A zero, negative or non-finite frame rate was supplied
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    /// Fatal error from the parsing grammar
    #[error("Subtitle error: {0}")]
    Subtitle(SubtitleError),
}

impl ConversionError {
    /// Short, stable name of the error kind, as printed by the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownFormat { .. } => "UnknownFormat",
            Self::UnsupportedTargetFormat(_) => "UnsupportedTargetFormat",
            Self::UnsupportedSourceFormat(_) => "UnsupportedSourceFormat",
            Self::InvalidFrameRate(_) => "InvalidFrameRate",
            Self::Subtitle(SubtitleError::InvalidFrameRate(_)) => "InvalidFrameRate",
            Self::Subtitle(SubtitleError::NoEntries { .. }) => "NoEntries",
        }
    }
}

impl From<SubtitleError> for ConversionError {
    fn from(error: SubtitleError) -> Self {
        match error {
            SubtitleError::InvalidFrameRate(msg) => Self::InvalidFrameRate(msg),
            other => Self::Subtitle(other),
        }
    }
}

fn format_scores(scores: &[(SubtitleFormat, f64)]) -> String {
    scores
        .iter()
        .map(|(format, score)| format!("{}={:.2}", format, score))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a conversion
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error from the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parsing produced warnings and strict mode was requested
    #[error("{count} malformed entries in {path}")]
    Strict {
        /// Offending input
        path: String,
        /// Number of warnings
        count: usize,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
