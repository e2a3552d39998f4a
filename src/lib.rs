//! # Chatvault
//!
//! A Rust library for turning plaintext WhatsApp chat exports into typed,
//! de-duplicated and linked rows ready for storage.
//!
//! ## Overview
//!
//! An export is read in four stages:
//! - **Grammar** ([`parsing::parse_structure`]) splits the text into header
//!   lines and their continuation lines and classifies every header as a
//!   user message, a known system event or an unrecognized notice
//! - **Reducer** ([`parsing::reduce`]) turns that tree into flat
//!   [`Record`]s
//! - **Sanitizer** ([`core::sanitize`]) strips direction marks from names
//!   and splits attachment captions into messages of their own
//! - **Assembler** ([`core::assemble_room`]) resolves senders, links the
//!   messages into a chain and produces an [`AssembledRoom`](core::AssembledRoom)
//!
//! The [`import`] module runs whole batches of files through these stages
//! and hands the rooms to a [`RoomSink`](core::RoomSink).
//!
//! ## Quick Start
//!
//! ```rust
//! use chatvault::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let parser = create_parser(LocaleId::DeDe);
//!     let records = sanitize(parser.parse_str(
//!         "16.01.21, 23:00 - Du hast die Gruppe „Eiergilde“ erstellt\n\
//!          16.01.21, 23:09 - Anna: Hallo\n",
//!     )?);
//!
//!     assert_eq!(records.len(), 2);
//!     assert_eq!(records[0].event(), Some(SystemEvent::RoomCreateBySelf));
//!     assert_eq!(records[1].sender(), Some("Anna"));
//!     Ok(())
//! }
//! ```
//!
//! ## Batch import
//!
//! ```rust,no_run
//! use chatvault::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let locale = LocaleId::DeDe.locale();
//!     let sources: Vec<RoomSource> = discover_chat_files(Path::new("exports"), locale)?
//!         .into_iter()
//!         .map(|path| RoomSource::from_path(path, locale))
//!         .collect();
//!
//!     let mut importer = Importer::new(JsonlSink::create(Path::new("messages.jsonl"))?);
//!     let report = importer.import(&sources)?;
//!     println!("{} rooms, {} failed", report.rooms.len(), report.failures.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`parsing`] - grammar engine, event catalogs and the reducer
//! - [`parser`] - [`Parser`](parser::Parser) trait, [`LogParser`](parser::LogParser), [`LocaleId`](parser::LocaleId)
//! - [`message`] - [`Record`] and the message data model
//! - [`core`] - sanitizer, sender table, assembler, rows and sinks
//! - [`import`] - batch import of many files
//! - [`config`] - parser, assembler and import settings
//! - [`progress`] - progress callbacks
//! - [`cli`] - CLI types (requires `cli` feature)
//! - [`error`] - unified error types ([`ChatvaultError`], [`Result`])
//! - [`prelude`] - convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod import;
pub mod message;
pub mod parser;
pub mod parsing;
pub mod progress;

pub use error::{ChatvaultError, GrammarMismatch, Result};
pub use message::Record;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatvault::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ChatvaultError, Result};

    pub use crate::message::{
        Capabilities, Record, RecordBody, RoomMessage, SystemEvent, SystemMessage, Timestamp,
    };

    pub use crate::parser::{LocaleId, LogParser, Parser, create_parser};

    pub use crate::config::{AssemblerConfig, ImportConfig, ParserConfig, UnknownEventPolicy};

    pub use crate::core::{
        AssembledRoom, MemorySink, RoomSink, SenderTable, SystemSender, assemble_room, sanitize,
    };

    #[cfg(feature = "json-output")]
    pub use crate::core::{JsonlSink, to_json, to_jsonl, write_json};

    pub use crate::import::{
        ImportReport, Importer, RoomSource, discover_chat_files, room_name_from_path,
    };

    pub use crate::progress::{Progress, ProgressCallback};
}
