//! Progress reporting for batch imports.
//!
//! The importer calls a [`ProgressCallback`] after each file has been
//! handled, successful or not.
//!
//! # Example
//!
//! ```rust
//! use chatvault::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress: Progress| {
//!     if let Some(pct) = progress.percentage() {
//!         println!("Imported {:.1}% of the files", pct);
//!     }
//! });
//!
//! for i in 0..4usize {
//!     callback(Progress::new(i + 1, Some(4)));
//! }
//! ```

use std::sync::Arc;

/// Progress of a batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    /// Files handled so far, including failed ones.
    pub files_processed: usize,

    /// Files in the batch, if known.
    pub total_files: Option<usize>,

    /// Messages stored so far.
    pub messages_processed: usize,

    /// Room of the file handled last.
    pub current_room: Option<String>,
}

impl Progress {
    /// Creates a new progress instance.
    pub fn new(files_processed: usize, total_files: Option<usize>) -> Self {
        Self {
            files_processed,
            total_files,
            ..Self::default()
        }
    }

    /// Sets the number of stored messages.
    #[must_use]
    pub fn with_messages(mut self, messages_processed: usize) -> Self {
        self.messages_processed = messages_processed;
        self
    }

    /// Sets the room handled last.
    #[must_use]
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.current_room = Some(room.into());
        self
    }

    /// Returns the progress as a percentage (0.0 - 100.0).
    ///
    /// Returns `None` if the total is not known.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatvault::progress::Progress;
    ///
    /// let progress = Progress::new(1, Some(4));
    /// assert_eq!(progress.percentage(), Some(25.0));
    ///
    /// let unknown = Progress::new(1, None);
    /// assert_eq!(unknown.percentage(), None);
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_files.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.files_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns whether every file has been handled.
    pub fn is_complete(&self) -> bool {
        self.total_files
            .map(|total| self.files_processed >= total)
            .unwrap_or(false)
    }

    /// Returns the number of files left.
    pub fn remaining_files(&self) -> Option<usize> {
        self.total_files
            .map(|total| total.saturating_sub(self.files_processed))
    }
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints to stderr.
///
/// # Example
///
/// ```rust
/// use chatvault::progress::{Progress, stderr_progress};
///
/// let callback = stderr_progress();
/// // Prints "[1/2] Eiergilde" to stderr
/// callback(Progress::new(1, Some(2)).with_room("Eiergilde"));
/// ```
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|progress: Progress| {
        let room = progress.current_room.as_deref().unwrap_or("");
        match progress.total_files {
            Some(total) => eprintln!("[{}/{}] {}", progress.files_processed, total, room),
            None => eprintln!("[{}] {}", progress.files_processed, room),
        }
    })
}
