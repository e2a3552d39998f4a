//! Unified error types for chatvault.
//!
//! This module provides a single [`ChatvaultError`] enum that covers all error
//! cases in the library, plus [`GrammarMismatch`], the positional cause carried
//! by every parse failure.
//!
//! # Error Handling Philosophy
//!
//! - A failure is always attributable to **one** input file; the batch importer
//!   reports it and moves on to the next file.
//! - Library users get typed errors they can match on.
//! - Nothing is coerced silently: a record that breaks its own invariants is an
//!   error, not a warning.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// A specialized [`Result`] type for chatvault operations.
///
/// # Example
///
/// ```rust
/// use chatvault::error::Result;
/// use chatvault::Record;
///
/// fn my_function() -> Result<Vec<Record>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatvaultError>;

/// The error type for all chatvault operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatvaultError {
    /// An I/O error occurred while reading an export or writing a sink.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The export text does not conform to the log grammar.
    ///
    /// Fatal for the one file it names, never for the batch.
    #[error("Failed to parse chat log{}: {source}", display_path(path.as_deref()))]
    Parse {
        /// The file the text came from, if known
        path: Option<PathBuf>,
        /// Where and why the grammar stopped matching
        #[source]
        source: GrammarMismatch,
    },

    /// A header line matched no system-event phrase and the parser runs with
    /// [`UnknownEventPolicy::Fail`](crate::config::UnknownEventPolicy::Fail).
    #[error("Unrecognized system event on line {line}{}: {text:?}", display_path(path.as_deref()))]
    UnrecognizedEvent {
        /// The file the line came from, if known
        path: Option<PathBuf>,
        /// 1-based line number
        line: usize,
        /// The event phrase that failed to match
        text: String,
    },

    /// A record violates the invariants of the data model.
    ///
    /// This signals a mismatch between grammar and classifier and is raised
    /// immediately instead of being patched over.
    #[error("Invalid record: {reason}")]
    InvalidRecord {
        /// What is wrong with the record
        reason: String,
    },

    /// Two sender tables disagree about the id of a name.
    #[error("Sender '{name}' already has id {existing}, refusing to remap it to {incoming}")]
    SenderConflict {
        /// The sender name
        name: String,
        /// The id already stored for that name
        existing: Uuid,
        /// The id that was about to be merged
        incoming: Uuid,
    },

    /// A header carried date/time fields that are not a calendar minute.
    #[error("Invalid timestamp '{input}'")]
    InvalidTimestamp {
        /// The raw timestamp text
        input: String,
    },

    /// The requested locale has no grammar.
    #[error("Unknown locale '{input}'. Expected one of: {expected}")]
    InvalidLocale {
        /// The locale string that was provided
        input: String,
        /// Comma-separated list of supported locales
        expected: String,
    },

    /// JSON (de)serialization error in a sink or sender seed file.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| format!(" (file: {})", p.display()))
        .unwrap_or_default()
}

/// Position and cause of a grammar mismatch.
///
/// `offset` is the furthest byte position the grammar matched before giving
/// up; `line` and `column` are the same position in human terms (both 1-based).
/// Text before the first header is rejected at its line start. A header whose
/// fields are no calendar minute is rejected at its date, or at its time when
/// only the time is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: expected {expected}, found {found:?}")]
pub struct GrammarMismatch {
    /// 1-based line number
    pub line: usize,
    /// 1-based column (in characters)
    pub column: usize,
    /// Byte offset of the furthest match into the input
    pub offset: usize,
    /// What the grammar would have accepted at this position
    pub expected: &'static str,
    /// The offending line, without its terminator
    pub found: String,
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatvaultError {
    /// Creates a parse error from a grammar mismatch.
    pub fn parse(source: GrammarMismatch, path: Option<PathBuf>) -> Self {
        ChatvaultError::Parse { path, source }
    }

    /// Creates an invalid record error.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        ChatvaultError::InvalidRecord {
            reason: reason.into(),
        }
    }

    /// Creates an invalid timestamp error.
    pub fn invalid_timestamp(input: impl Into<String>) -> Self {
        ChatvaultError::InvalidTimestamp {
            input: input.into(),
        }
    }

    /// Attaches the originating file to errors that carry one.
    ///
    /// Errors that already name a file keep it.
    #[must_use]
    pub fn with_path(mut self, file: &Path) -> Self {
        match &mut self {
            ChatvaultError::Parse { path, .. } | ChatvaultError::UnrecognizedEvent { path, .. } => {
                if path.is_none() {
                    *path = Some(file.to_path_buf());
                }
            }
            _ => {}
        }
        self
    }

    /// Returns the file this error is attributed to, if any.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            ChatvaultError::Parse { path, .. } | ChatvaultError::UnrecognizedEvent { path, .. } => {
                path.as_deref()
            }
            _ => None,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatvaultError::Io(_))
    }

    /// Returns `true` if this is a grammar mismatch.
    pub fn is_parse(&self) -> bool {
        matches!(self, ChatvaultError::Parse { .. })
    }

    /// Returns `true` if this is a strict-mode unrecognized event.
    pub fn is_unrecognized_event(&self) -> bool {
        matches!(self, ChatvaultError::UnrecognizedEvent { .. })
    }

    /// Returns `true` if this is an invariant violation.
    pub fn is_invalid_record(&self) -> bool {
        matches!(self, ChatvaultError::InvalidRecord { .. })
    }
}
