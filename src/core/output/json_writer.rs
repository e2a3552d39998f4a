//! JSON output writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::models::{AssembledRoom, SenderRow};
use crate::error::Result;

#[derive(Serialize)]
struct Document<'a> {
    senders: &'a [SenderRow],
    rooms: &'a [AssembledRoom],
}

/// Writes one pretty-printed JSON document holding the run's senders and rooms.
///
/// `senders` are the rows the sink received outside any room, i.e. the
/// system sender. Every `sender_id` in the document resolves either to one of
/// them or to a row in some room's own `senders`.
///
/// # Format
/// ```json
/// {
///   "senders": [{"id": "...", "name": "WhatsApp System"}],
///   "rooms": [
///     {"room": {...}, "senders": [...], "messages": [...], "links": [...], "files": [...]}
///   ]
/// }
/// ```
pub fn write_json(senders: &[SenderRow], rooms: &[AssembledRoom], output_path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, &Document { senders, rooms })?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Converts one room to a pretty-printed JSON document.
///
/// Same shape as one element of [`write_json`]'s `rooms`, returned as a
/// String instead of being written to a file.
pub fn to_json(room: &AssembledRoom) -> Result<String> {
    Ok(serde_json::to_string_pretty(room)?)
}
