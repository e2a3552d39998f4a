//! Batch import of chat exports.
//!
//! An [`Importer`] takes a list of [`RoomSource`]s through the whole
//! pipeline: parse and sanitize every source (on the rayon pool with the
//! `parallel` feature), then assemble and store the rooms one after another
//! in input order. Sender identities live in a single [`SenderTable`] that
//! only this sequential stage touches.
//!
//! Each room is all-or-nothing: it is assembled against a read-only view of
//! the table, and its new senders are merged only after the sink has taken
//! the whole room. A failing file is reported in the [`ImportReport`] and
//! never stops the batch.
//!
//! # Example
//!
//! ```rust
//! use chatvault::core::output::MemorySink;
//! use chatvault::import::{Importer, RoomSource};
//!
//! let mut importer = Importer::new(MemorySink::new());
//! let report = importer.import(&[
//!     RoomSource::from_string("Anna", "16.01.21, 23:09 - Anna: Hi\n"),
//!     RoomSource::from_string("Broken", "kein Header\n"),
//! ])?;
//!
//! assert_eq!(report.rooms.len(), 1);
//! assert_eq!(report.failures.len(), 1);
//! assert!(importer.senders().get("Anna").is_some());
//! # Ok::<(), chatvault::ChatvaultError>(())
//! ```

use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::ImportConfig;
use crate::core::assembler::assemble_room;
use crate::core::output::RoomSink;
use crate::core::sanitizer::sanitize;
use crate::core::senders::{SenderTable, SystemSender};
use crate::error::{ChatvaultError, Result};
use crate::message::Record;
use crate::parser::{LogParser, Parser};
use crate::parsing::Locale;
use crate::progress::{Progress, ProgressCallback, no_progress};

/// Room name of an export file.
///
/// The file stem without the locale's chat-file prefix; stems without the
/// prefix are used whole.
///
/// ```rust
/// use chatvault::import::room_name_from_path;
/// use chatvault::parsing::German;
/// use std::path::Path;
///
/// let path = Path::new("/exports/WhatsApp Chat mit Eiergilde.txt");
/// assert_eq!(room_name_from_path(path, &German), "Eiergilde");
/// ```
pub fn room_name_from_path(path: &Path, locale: &dyn Locale) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix(locale.chat_file_prefix()) {
        Some(name) => name.to_string(),
        None => stem,
    }
}

/// Returns `true` if the file name looks like an export of this locale.
pub fn is_chat_file(path: &Path, locale: &dyn Locale) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let extension_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(locale.chat_file_extension()));
    name.starts_with(locale.chat_file_prefix()) && extension_matches
}

/// Finds chat exports below `root`, sorted by path.
///
/// A `root` that is a file is returned as is, whatever its name. Symlinks are
/// followed. Only an unreadable `root` is an error; entries below it that
/// cannot be read are logged and skipped.
pub fn discover_chat_files(root: &Path, locale: &dyn Locale) -> Result<Vec<PathBuf>> {
    if std::fs::metadata(root)?.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_chat_file(entry.path(), locale) {
            files.push(entry.into_path());
        }
    }
    debug!(root = %root.display(), found = files.len(), "discovered chat files");
    Ok(files)
}

#[derive(Debug, Clone)]
enum Input {
    File(PathBuf),
    Text(String),
}

/// One room to import.
#[derive(Debug, Clone)]
pub struct RoomSource {
    room_name: String,
    input: Input,
}

impl RoomSource {
    /// An export file; the room is named after the file.
    pub fn from_path(path: impl Into<PathBuf>, locale: &dyn Locale) -> Self {
        let path = path.into();
        Self {
            room_name: room_name_from_path(&path, locale),
            input: Input::File(path),
        }
    }

    /// Export text already in memory.
    pub fn from_string(room_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            input: Input::Text(text.into()),
        }
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// The file this source reads, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.input {
            Input::File(path) => Some(path),
            Input::Text(_) => None,
        }
    }

    /// Parses and sanitizes the source.
    fn load(&self, parser: &LogParser) -> Result<Vec<Record>> {
        let records = match &self.input {
            Input::File(path) => parser.parse(path)?,
            Input::Text(text) => parser
                .parse_str(text)?
                .into_iter()
                .map(|record| record.with_room_name(self.room_name.as_str()))
                .collect(),
        };
        Ok(sanitize(records))
    }
}

/// A room that made it into the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: Uuid,
    pub name: String,
    pub is_dm: bool,
    pub messages: usize,
    pub new_senders: usize,
    pub files: usize,
}

/// A source that could not be imported.
#[derive(Debug)]
pub struct ImportFailure {
    pub room_name: String,
    pub path: Option<PathBuf>,
    pub error: ChatvaultError,
}

/// Outcome of [`Importer::import`].
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Stored rooms, in input order
    pub rooms: Vec<RoomSummary>,
    /// Sources without any records
    pub empty: Vec<String>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Number of sources handled.
    pub fn total(&self) -> usize {
        self.rooms.len() + self.empty.len() + self.failures.len()
    }

    /// Returns `true` if no source failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Messages stored across all rooms.
    pub fn messages(&self) -> usize {
        self.rooms.iter().map(|r| r.messages).sum()
    }
}

/// Runs sources through parse, sanitize, assemble and sink.
pub struct Importer<S: RoomSink> {
    sink: S,
    senders: SenderTable,
    system: SystemSender,
    config: ImportConfig,
    progress: ProgressCallback,
    system_written: bool,
}

impl<S: RoomSink> Importer<S> {
    /// Creates an importer with an empty sender table and a fresh system
    /// sender.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            senders: SenderTable::new(),
            system: SystemSender::generate(),
            config: ImportConfig::default(),
            progress: no_progress(),
            system_written: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// Seeds the sender table, e.g. from the store.
    #[must_use]
    pub fn with_senders(mut self, senders: SenderTable) -> Self {
        self.senders = senders;
        self
    }

    /// Uses a known system sender instead of a fresh one.
    #[must_use]
    pub fn with_system_sender(mut self, system: SystemSender) -> Self {
        self.system = system;
        self
    }

    /// Reports progress after every source.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = callback;
        self
    }

    pub fn senders(&self) -> &SenderTable {
        &self.senders
    }

    pub fn system_sender(&self) -> &SystemSender {
        &self.system
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Returns the sink and the grown sender table.
    pub fn into_parts(self) -> (S, SenderTable) {
        (self.sink, self.senders)
    }

    /// Imports a batch of sources.
    ///
    /// Per-source failures end up in the report.
    ///
    /// # Errors
    ///
    /// Only fails if the sink cannot store the system sender or cannot be
    /// flushed at the end.
    pub fn import(&mut self, sources: &[RoomSource]) -> Result<ImportReport> {
        if !self.system_written {
            self.sink.write_sender(&self.system.row())?;
            self.system_written = true;
        }

        let loaded = self.load_all(sources);
        let total = sources.len();
        let mut report = ImportReport::default();

        for (index, (source, records)) in sources.iter().zip(loaded).enumerate() {
            match records.and_then(|records| self.store(source, &records)) {
                Ok(Some(summary)) => report.rooms.push(summary),
                Ok(None) => {
                    debug!(room = source.room_name(), "empty chat, nothing stored");
                    report.empty.push(source.room_name.clone());
                }
                Err(error) => {
                    let error = match source.path() {
                        Some(path) => error.with_path(path),
                        None => error,
                    };
                    warn!(room = source.room_name(), error = %error, "skipping chat");
                    report.failures.push(ImportFailure {
                        room_name: source.room_name.clone(),
                        path: source.path().map(Path::to_path_buf),
                        error,
                    });
                }
            }

            (self.progress)(
                Progress::new(index + 1, Some(total))
                    .with_messages(report.messages())
                    .with_room(source.room_name()),
            );
        }

        self.sink.finish()?;
        debug!(
            rooms = report.rooms.len(),
            empty = report.empty.len(),
            failures = report.failures.len(),
            "import finished"
        );
        Ok(report)
    }

    fn load_all(&self, sources: &[RoomSource]) -> Vec<Result<Vec<Record>>> {
        let parser = LogParser::with_config(self.config.parser.clone());

        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                return sources.par_iter().map(|source| source.load(&parser)).collect();
            }
        }

        sources.iter().map(|source| source.load(&parser)).collect()
    }

    /// Assembles one room, hands it to the sink and absorbs its senders.
    fn store(&mut self, source: &RoomSource, records: &[Record]) -> Result<Option<RoomSummary>> {
        let Some(room) = assemble_room(
            records,
            source.room_name(),
            &self.senders,
            &self.system,
            &self.config.assembler,
        )?
        else {
            return Ok(None);
        };

        self.sink.write_room(&room)?;
        self.senders.absorb(&room.senders)?;

        Ok(Some(RoomSummary {
            room_id: room.room.id,
            name: room.room.name.clone(),
            is_dm: room.room.is_dm,
            messages: room.messages.len(),
            new_senders: room.senders.len(),
            files: room.files.len(),
        }))
    }
}
