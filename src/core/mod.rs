//! From records to storable rooms.
//!
//! This module contains:
//! - [`sanitizer`] - cleans parsed records and splits attachment captions
//! - [`senders`] - sender identities shared across rooms
//! - [`assembler`] - builds one room from sanitized records
//! - [`models`] - the rows a room is stored as
//! - [`output`] - sinks that store rooms (memory, JSON, JSONL)
//!
//! # Quick Start
//!
//! ```rust
//! use chatvault::config::AssemblerConfig;
//! use chatvault::core::{SenderTable, SystemSender, assemble_room, sanitize};
//! use chatvault::parser::{LogParser, Parser};
//!
//! let records = sanitize(LogParser::new().parse_str("16.01.21, 23:09 - Anna: Hi\n")?);
//! let room = assemble_room(
//!     &records,
//!     "Anna",
//!     &SenderTable::new(),
//!     &SystemSender::generate(),
//!     &AssemblerConfig::default(),
//! )?
//! .expect("one message");
//!
//! assert!(room.room.is_dm);
//! assert_eq!(room.messages[0].depth, 1);
//! # Ok::<(), chatvault::ChatvaultError>(())
//! ```

pub mod assembler;
pub mod models;
pub mod output;
pub mod sanitizer;
pub mod senders;

pub use assembler::assemble_room;
pub use models::{AssembledRoom, FileRow, LinkRow, MessageRow, RoomRow, SenderRow};
pub use output::{MemorySink, RoomSink};
pub use sanitizer::{sanitize, sanitize_record};
pub use senders::{SYSTEM_SENDER_NAME, SenderTable, SystemSender};

#[cfg(feature = "json-output")]
pub use output::{JsonlSink, to_json, to_jsonl, write_json};
