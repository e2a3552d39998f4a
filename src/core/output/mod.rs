//! Sinks for assembled rooms.
//!
//! A [`RoomSink`] receives every room of an import, one complete
//! [`AssembledRoom`] at a time:
//! - [`MemorySink`] - keeps rooms in memory (tests, library callers)
//! - [`JsonlSink`] / [`to_jsonl`] - one JSON object per row, tagged with its
//!   table - requires `json-output` feature
//! - [`write_json`] / [`to_json`] - pretty JSON documents - requires
//!   `json-output` feature
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "json-output")]
//! # fn main() -> chatvault::Result<()> {
//! use chatvault::core::output::JsonlSink;
//! use chatvault::import::{Importer, RoomSource};
//!
//! let mut importer = Importer::new(JsonlSink::new(Vec::new()));
//! importer.import(&[RoomSource::from_string("Anna", "16.01.21, 23:09 - Anna: Hi\n")])?;
//!
//! let output = String::from_utf8(importer.into_sink().into_inner()).unwrap();
//! assert!(output.lines().any(|line| line.contains(r#""table":"room""#)));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json-output"))]
//! # fn main() {}
//! ```

#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{JsonlRow, JsonlSink, to_jsonl};

use crate::core::models::{AssembledRoom, SenderRow};
use crate::error::Result;

/// Destination of assembled rooms.
///
/// A room is handed over whole; a sink that fails must not leave part of a
/// room behind where it can avoid it.
pub trait RoomSink {
    /// Stores a sender that exists independently of any room, such as the
    /// system sender.
    fn write_sender(&mut self, sender: &SenderRow) -> Result<()>;

    /// Stores one room.
    fn write_room(&mut self, room: &AssembledRoom) -> Result<()>;

    /// Flushes anything buffered.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects rooms in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    senders: Vec<SenderRow>,
    rooms: Vec<AssembledRoom>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Senders written outside of rooms.
    pub fn senders(&self) -> &[SenderRow] {
        &self.senders
    }

    /// Rooms in the order they were written.
    pub fn rooms(&self) -> &[AssembledRoom] {
        &self.rooms
    }

    pub fn into_rooms(self) -> Vec<AssembledRoom> {
        self.rooms
    }
}

impl RoomSink for MemorySink {
    fn write_sender(&mut self, sender: &SenderRow) -> Result<()> {
        self.senders.push(sender.clone());
        Ok(())
    }

    fn write_room(&mut self, room: &AssembledRoom) -> Result<()> {
        self.rooms.push(room.clone());
        Ok(())
    }
}
