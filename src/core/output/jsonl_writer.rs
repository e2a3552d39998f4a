//! JSON Lines (JSONL) sink.
//!
//! Every row becomes one line, tagged with the table it belongs to:
//!
//! ```jsonl
//! {"table":"sender","id":"…","name":"Alice"}
//! {"table":"room","id":"…","name":"Eiergilde","is_dm":false,…}
//! {"table":"message","id":"…","depth":1,…}
//! {"table":"message_link","message_id":"…","parent_message_id":"…"}
//! ```
//!
//! Rows of a room are ordered so that each line only references ids from
//! earlier lines or from its own room: senders, files, messages, links, and
//! the room last.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::RoomSink;
use crate::core::models::{AssembledRoom, FileRow, LinkRow, MessageRow, RoomRow, SenderRow};
use crate::error::Result;

/// One output line.
#[derive(Debug, Serialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum JsonlRow<'a> {
    Sender(&'a SenderRow),
    Room(&'a RoomRow),
    Message(&'a MessageRow),
    MessageLink(&'a LinkRow),
    File(&'a FileRow),
}

impl<'a> JsonlRow<'a> {
    /// All rows of a room in write order.
    pub fn from_room(room: &'a AssembledRoom) -> Vec<Self> {
        let mut rows = Vec::with_capacity(room.row_count());
        rows.extend(room.senders.iter().map(JsonlRow::Sender));
        rows.extend(room.files.iter().map(JsonlRow::File));
        rows.extend(room.messages.iter().map(JsonlRow::Message));
        rows.extend(room.links.iter().map(JsonlRow::MessageLink));
        rows.push(JsonlRow::Room(&room.room));
        rows
    }
}

/// Converts a room to JSONL text.
pub fn to_jsonl(room: &AssembledRoom) -> Result<String> {
    let mut output = String::new();
    for row in JsonlRow::from_room(room) {
        output.push_str(&serde_json::to_string(&row)?);
        output.push('\n');
    }
    Ok(output)
}

/// Writes rooms as JSON Lines.
///
/// A room is serialized completely before the first byte of it is written.
pub struct JsonlSink<W: Write> {
    writer: W,
    rooms: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Creates (or truncates) a JSONL file.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, rooms: 0 }
    }

    /// Number of rooms written so far.
    pub fn rooms_written(&self) -> usize {
        self.rooms
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RoomSink for JsonlSink<W> {
    fn write_sender(&mut self, sender: &SenderRow) -> Result<()> {
        let line = serde_json::to_string(&JsonlRow::Sender(sender))?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn write_room(&mut self, room: &AssembledRoom) -> Result<()> {
        let text = to_jsonl(room)?;
        self.writer.write_all(text.as_bytes())?;
        self.rooms += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
